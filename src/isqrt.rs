/// Integer square root, `floor(sqrt(n))`.
///
/// Binary restoring method: one result bit per step, most significant
/// first, using only shifts, adds and compares. `root` carries the partial
/// result shifted left by one, so the trial subtrahend for bit `k` is
/// `(root + 2^k) << k`, which is `(r + 2^k)^2 - r^2` for the partial root `r`.
pub const fn isqrt(mut n: u32) -> u32 {
    let mut root: u32 = 0;
    let mut k = 16;
    while k > 0 {
        k -= 1;
        let trial = (root + (1 << k)) << k;
        if n >= trial {
            n -= trial;
            root |= 2 << k;
        }
    }
    root >> 1
}

#[cfg(test)]
mod tests {
    use super::*;

    // Newton reference, only trusted for the comparison below.
    fn nsqrt(x: u32) -> u32 {
        if x == 0 {
            return 0;
        }
        let mut result = 2 << (x.ilog2() >> 1);
        loop {
            let next = (result + x / result) >> 1;
            if next >= result {
                return result;
            }
            result = next;
        }
    }

    fn check(x: u32) {
        let s = isqrt(x) as u64;
        let x64 = x as u64;
        assert!(s * s <= x64, "x={x}");
        assert!(x64 < (s + 1) * (s + 1), "x={x}");
    }

    #[test]
    fn small_values() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(2), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(144), 12);
        assert_eq!(isqrt(145), 12);
        assert_eq!(isqrt(168), 12);
        assert_eq!(isqrt(169), 13);
    }

    #[test]
    fn dense_low_range() {
        for x in 0..=1 << 20 {
            check(x);
            assert_eq!(isqrt(x), nsqrt(x), "x={x}");
        }
    }

    #[test]
    fn squares_and_neighbours() {
        for r in 1..=u16::MAX as u32 {
            let sq = r * r;
            assert_eq!(isqrt(sq), r);
            assert_eq!(isqrt(sq - 1), r - 1);
        }
    }

    #[test]
    fn top_of_range() {
        assert_eq!(isqrt(u32::MAX), 65_535);
        assert_eq!(isqrt(65_535 * 65_535), 65_535);
        for x in (u32::MAX - 100_000)..=u32::MAX {
            check(x);
        }
    }

    #[test]
    fn monotonic() {
        let mut prev = 0;
        let mut x: u32 = 0;
        // Stride through the whole range with an odd step.
        while let Some(next) = x.checked_add(65_521) {
            let s = isqrt(x);
            assert!(s >= prev, "x={x}");
            check(x);
            prev = s;
            x = next;
        }
    }
}
