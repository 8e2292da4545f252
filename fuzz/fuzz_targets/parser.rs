#![no_main]

use esc::{parse_expr_source, parse_program_source, ParseOptions, Reduction};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    for reduction in [Reduction::SingleStep, Reduction::Cascading] {
        let options = ParseOptions { reduction };
        let (expr, diagnostics) = parse_expr_source(&src, options);
        let span = expr.span();
        assert!(span.start <= span.end && span.end <= src.len());
        assert!(diagnostics
            .windows(2)
            .all(|pair| pair[0].span.start <= pair[1].span.start));
        let _ = parse_program_source(&src, options);
    }
});
