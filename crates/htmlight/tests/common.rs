#![allow(missing_docs)]
#![allow(dead_code)]

use std::io::Write;

use htmlight::{Attached, Decorator};

pub const C_SOURCE: &str = "#include <stdio.h>\nint x = 42; // hi\n";

pub const SHELL_SCRIPT: &str = "#!/bin/sh\necho $HOME \"hi $x\" # c\n";

pub const MAIL_MESSAGE: &str = "Subject: Hello\nTo: a,\n b\n\nHi there\n";

pub const ORIGINAL: &str = "fn main() {\n    let x = 1;\n    if x < 2 {\n        run();\n    }\n}\n";

pub const DIFF: &str = "\
--- a/main.rs
+++ b/main.rs
@@ -2,3 +2,4 @@
     let x = 1;
-    if x < 2 {
+    if x <= 2 {
+        log(\"x\");
         run();
";

/// Write `input` through `decorator` in chunks of `chunk` bytes.
pub fn decorate(decorator: &mut dyn Decorator, input: &str, chunk: usize) -> String {
    let mut out = Vec::new();
    let mut session = Attached::new(decorator, &mut out);
    for piece in input.as_bytes().chunks(chunk.max(1)) {
        session.write_all(piece).unwrap();
    }
    session.detach().unwrap();
    drop(session);
    String::from_utf8(out).unwrap()
}
