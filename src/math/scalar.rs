/// Golden-section search for the maximum of a unimodal function on a closed
/// interval. Returns `(argmax, max)`.
///
/// Integer-backed profit curves are step functions, so the search stops once
/// the interval is narrower than `tol` and callers should treat the argmax as
/// approximate.
pub fn maximize_unimodal<F>(f: F, a: f64, b: f64, tol: f64, max_iter: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let phi = 0.5 * (1.0 + 5.0_f64.sqrt());
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };

    let mut c = b - (b - a) / phi;
    let mut d = a + (b - a) / phi;
    let mut fc = f(c);
    let mut fd = f(d);

    for _ in 0..max_iter {
        if (b - a).abs() <= tol {
            break;
        }
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - (b - a) / phi;
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + (b - a) / phi;
            fd = f(d);
        }
    }

    if fc > fd {
        (c, fc)
    } else {
        (d, fd)
    }
}

/// Golden-section search with extra probe points evaluated up front.
///
/// Discrete profit surfaces sometimes have their best value on a plateau near
/// the low end of the interval; the seeds (clamped into `[a, b]`) guard
/// against the section search sliding past it.
pub fn maximize_with_seeds<F>(
    f: F,
    a: f64,
    b: f64,
    seeds: &[f64],
    tol: f64,
    max_iter: usize,
) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let (mut best_x, mut best_f) = maximize_unimodal(&f, a, b, tol, max_iter);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    for &seed in seeds {
        let x = seed.clamp(lo, hi);
        let fx = f(x);
        if fx > best_f {
            best_x = x;
            best_f = fx;
        }
    }
    (best_x, best_f)
}
