// Integer helpers for ratio classification.
//
// `gcd` reduces fractions for the reference interval list; `prime_limit`
// classifies a ratio by its largest prime factor, which selects both the
// display color and the filter bucket a match falls into.
//
// See also: `rational.rs` (high-limit penalty during candidate selection),
// `lut.rs` (per-entry limit), `reference.rs` (irreducible ratio listing).

/// Greatest common divisor by the Euclidean algorithm. `gcd(a, 0) == a`.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Largest prime factor of `n`, or 1 when `n == 1`.
///
/// Trial division by increasing `d` while `d * d <= remaining`; whatever is
/// left above 1 afterwards is itself prime. Callers only pass positive
/// integers; `0` is treated like `1`.
pub fn prime_limit(n: u64) -> u64 {
    if n <= 1 {
        return 1;
    }
    let mut limit = 1;
    let mut remaining = n;
    let mut d = 2;
    while d * d <= remaining {
        while remaining % d == 0 {
            limit = limit.max(d);
            remaining /= d;
        }
        d += 1;
    }
    if remaining > 1 {
        limit = limit.max(remaining);
    }
    limit
}

/// Prime limit of the ratio `n/d`: the larger of the two terms' limits.
pub fn ratio_prime_limit(n: u64, d: u64) -> u64 {
    prime_limit(n).max(prime_limit(d))
}
