/// Compiles a CSS selector once and hands out a `&'static Selector`.
#[macro_export]
macro_rules! selector {
    ($e: expr) => {{
        use ::once_cell::sync::Lazy;
        use ::scraper::Selector;
        static SELECTOR: Lazy<Selector> = Lazy::new(|| {
            Selector::parse($e).unwrap_or_else(|e| panic!("bad selector {:?}: {e:?}", $e))
        });
        &*SELECTOR
    }};
}

/// Compiles a regular expression once and hands out a `&'static Regex`.
#[macro_export]
macro_rules! regex {
    ($e: expr) => {{
        use ::once_cell::sync::Lazy;
        use ::regex::Regex;
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new($e).unwrap_or_else(|e| panic!("bad pattern {:?}: {e}", $e)));
        &*PATTERN
    }};
}
