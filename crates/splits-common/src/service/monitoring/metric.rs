#[macro_export]
macro_rules! measure_duration {
    ($e: expr) => {{
        let now = std::time::Instant::now();

        let result = $e;
        (result, now.elapsed())
    }};
}

/// Emits a metric as a `tracing` event so that any metric-aware layer can collect it.
#[macro_export]
macro_rules! metric {
    (counter [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        $crate::service::tracing::debug!(monotonic_counter.$label = $i, $($field = $value),*)
    };
    (on error $e: expr => counter [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        if let Err(ref e) = $e {
            $crate::service::tracing::debug!(counter.$label = $i, $($field = $value,)* error = e.to_string());
        }
    };
    (gauge [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        $crate::service::tracing::debug!(gauge.$label = $i, $($field = $value),*)
    };
    (histogram [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        $crate::service::tracing::debug!(histogram.$label = $i as f64, $($field = $value),*)
    };
}
