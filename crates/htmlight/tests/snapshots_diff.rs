#![expect(missing_docs)]

mod common;

use htmlight::decorators::HtmlEscaper;
use htmlight::{DecoratorChain, DiffOptions, OriginalSide, SideBySide};

use crate::common::{DIFF, ORIGINAL};

fn render(options: DiffOptions) -> String {
    let mut left = HtmlEscaper::new();
    let mut right = HtmlEscaper::new();
    let mut out = Vec::new();
    SideBySide::new(&mut left, &mut right, options)
        .render(ORIGINAL.as_bytes(), DIFF.as_bytes(), &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn side_by_side_table() {
    insta::assert_snapshot!(render(DiffOptions::default()), @r#"
    <tr>
    <td><pre class="code">
    fn main() {
        let x = 1;
    </pre></td>
    <td><pre class="code">
    fn main() {
        let x = 1;
    </pre></td>
    </tr>
    <tr class="diffConflict">
    <td><pre class="code">
        if x &lt; 2 {

    </pre></td>
    <td><pre class="code">
        if x &lt;= 2 {
            log(&quot;x&quot;);
    </pre></td>
    </tr>
    <tr>
    <td><pre class="code">
            run();
        }
    }
    </pre></td>
    <td><pre class="code">
            run();
        }
    }
    </pre></td>
    </tr>
    "#);
}

#[test]
fn rendering_is_repeatable() {
    let mut left = DecoratorChain::new();
    left.push_back(HtmlEscaper::new());
    let mut right = HtmlEscaper::new();
    let mut side_by_side = SideBySide::new(&mut left, &mut right, DiffOptions::default());
    let mut first = Vec::new();
    let mut second = Vec::new();
    side_by_side.render(ORIGINAL.as_bytes(), DIFF.as_bytes(), &mut first).unwrap();
    side_by_side.render(ORIGINAL.as_bytes(), DIFF.as_bytes(), &mut second).unwrap();
    assert_eq!(first, second);
    assert_eq!(String::from_utf8(first).unwrap(), render(DiffOptions::default()));
}

#[test]
fn original_on_the_right_mirrors_the_columns() {
    // The reverse diff read against the new version.
    let new_version = "fn main() {\n    let x = 1;\n    if x <= 2 {\n        log(\"x\");\n        run();\n    }\n}\n";
    let reverse = "@@ -2,3 +2,4 @@\n     let x = 1;\n-    if x < 2 {\n+    if x <= 2 {\n+        log(\"x\");\n         run();\n";
    let mut left = HtmlEscaper::new();
    let mut right = HtmlEscaper::new();
    let mut out = Vec::new();
    SideBySide::new(
        &mut left,
        &mut right,
        DiffOptions {
            original_side: OriginalSide::Right,
            tab_width: None,
        },
    )
    .render(new_version.as_bytes(), reverse.as_bytes(), &mut out)
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), render(DiffOptions::default()));
}
