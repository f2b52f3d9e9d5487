use rayon::ThreadPoolBuilder;

/// Size the global rayon pool from a `--threads` spec, `auto` meaning one
/// worker per logical CPU. Safe to call more than once; later calls are
/// ignored once the pool exists.
pub fn configure_threads(spec: &str) {
    let count = if spec.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        spec.parse().unwrap_or_else(|_| num_cpus::get())
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}
