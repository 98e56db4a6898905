//! Simulation engine
//!
//! Last-resort textual approximation used when nothing can actually run the
//! code: literal arguments of print-style calls are echoed back, one per
//! line. This is not an interpreter; non-literal arguments are skipped and
//! the caller is responsible for labelling the output as simulated.

use std::sync::OnceLock;

use regex::Regex;

use crate::languages::Language;

/// Scan `code` for literal print calls and join the matched literals
pub fn simulate(code: &str, language: Language) -> String {
    let literals: Vec<&str> = print_pattern(language)
        .captures_iter(code)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .collect();

    if literals.is_empty() {
        return format!("[{} simulation] no output detected", language.label());
    }
    literals.join("\n")
}

/// Compiled literal-print pattern for one language
fn print_pattern(language: Language) -> &'static Regex {
    fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
        cell.get_or_init(|| Regex::new(pattern).unwrap())
    }

    static PYTHON: OnceLock<Regex> = OnceLock::new();
    static JAVASCRIPT: OnceLock<Regex> = OnceLock::new();
    static JAVA: OnceLock<Regex> = OnceLock::new();
    static C: OnceLock<Regex> = OnceLock::new();
    static CPP: OnceLock<Regex> = OnceLock::new();

    // The c pattern intentionally does not require the closing parenthesis.
    match language {
        Language::Python => cached(&PYTHON, r#"print\(['"`](.*?)['"`]\)"#),
        Language::Javascript => cached(&JAVASCRIPT, r#"console\.log\(['"`](.*?)['"`]\)"#),
        Language::Java => cached(&JAVA, r#"System\.out\.println\(['"`](.*?)['"`]\)"#),
        Language::C => cached(&C, r#"printf\(['"`](.*?)['"`]"#),
        Language::Cpp => cached(&CPP, r#"cout\s*<<\s*['"`](.*?)['"`]"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_literals_joined_in_order() {
        let code = "print(\"one\")\nx = 1\nprint('two')";
        assert_eq!(simulate(code, Language::Python), "one\ntwo");
    }

    #[test]
    fn test_non_literal_arguments_skipped() {
        let code = "x = 5\nprint(x)\nprint(\"shown\")";
        assert_eq!(simulate(code, Language::Python), "shown");
    }

    #[test]
    fn test_placeholder_names_the_language() {
        assert_eq!(
            simulate("x = compute()", Language::Python),
            "[Python simulation] no output detected"
        );
        assert_eq!(
            simulate("let x = 1;", Language::Javascript),
            "[JavaScript simulation] no output detected"
        );
        assert_eq!(
            simulate("int main() { return 0; }", Language::Cpp),
            "[C++ simulation] no output detected"
        );
    }

    #[test]
    fn test_javascript_console_log_with_backticks() {
        let code = "console.log(`hello`);\nconsole.log(count);";
        assert_eq!(simulate(code, Language::Javascript), "hello");
    }

    #[test]
    fn test_java_println_literal() {
        let code = "public class Main { void run() { System.out.println(\"hi\"); } }";
        assert_eq!(simulate(code, Language::Java), "hi");
    }

    #[test]
    fn test_c_pattern_tolerates_missing_close_paren() {
        // Matches even mid-edit sources where the call is unterminated.
        assert_eq!(simulate("printf(\"partial", Language::C), "partial");
        assert_eq!(simulate("printf(\"done\");", Language::C), "done");
    }

    #[test]
    fn test_cpp_cout_spacing_variants() {
        let code = "cout<<\"tight\";\ncout  <<  \"loose\";";
        assert_eq!(simulate(code, Language::Cpp), "tight\nloose");
    }
}
