use opentell_core::StatePaths;

/// Initialize file-backed structured logging (SPEC_FULL.md ambient-stack
/// expansion). A hook's stdout/stderr are the host's, so diagnostics go to
/// `opentell.log` under the state directory instead, with `RUST_LOG`
/// overriding the default filter.
pub fn init(paths: &StatePaths) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = paths.log();
    let dir = log_path.parent()?.to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&dir, log_path.file_name()?);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .init();

    Some(guard)
}
