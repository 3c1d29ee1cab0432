//! # Structured Logging
//!
//! Span macros for clone runs. Every run gets a `run_id` so interleaved log
//! lines from concurrent copies can be grouped.

/// Create a tracing span for one clone run.
///
/// ```rust,ignore
/// let span = clone_span!("lb1", "ns-a", "ns-b");
/// ```
#[macro_export]
macro_rules! clone_span {
    ($load_balancer:expr, $source:expr, $destination:expr) => {
        tracing::info_span!(
            "clone_run",
            load_balancer = %$load_balancer,
            source_namespace = %$source,
            destination_namespace = %$destination,
            run_id = %uuid::Uuid::new_v4()
        )
    };
    ($load_balancer:expr, $source:expr, $destination:expr, $($field:tt)*) => {
        tracing::info_span!(
            "clone_run",
            load_balancer = %$load_balancer,
            source_namespace = %$source,
            destination_namespace = %$destination,
            run_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        let _span = clone_span!("lb1", "ns-a", "ns-b");
        let _span = clone_span!("lb1", "ns-a", "ns-b", dry_run = true);
    }
}
