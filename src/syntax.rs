pub mod highlight;
pub mod scan;
pub mod table;

use serde::{Deserialize, Serialize};
use syntect::parsing::SyntaxSet;
use tab_jump_core::{NoSyntax, SyntaxContext};

use crate::document::DocumentBuffer;
pub use highlight::{HighlightContext, ParseCache, ScopeState};
pub use scan::{ScanContext, ScanState};
pub use table::{BlockComment, SyntaxTable, SyntaxTables};

/// Which provider answers syntax questions for the jump evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxEngine {
    /// syntect when it knows the language, the lexical scanner otherwise
    #[default]
    Auto,
    Syntect,
    Scan,
}

/// Build the syntax context for the document's language mode
///
/// Languages without a syntax table (plain text, Markdown) get [`NoSyntax`],
/// which treats every quote as jumpable. `cache` must belong to `buffer` and
/// be invalidated from its lowest edited line.
pub fn context_for<'a>(
    buffer: &'a DocumentBuffer,
    cache: &'a mut ParseCache,
    tables: &'a SyntaxTables,
    syntax_set: &'a SyntaxSet,
    engine: SyntaxEngine,
) -> Box<dyn SyntaxContext + 'a> {
    let Some(table) = buffer.file_type().language().and_then(|lang| tables.get(lang)) else {
        return Box::new(NoSyntax);
    };

    if engine != SyntaxEngine::Scan
        && let Some(ctx) = HighlightContext::new(buffer, table, syntax_set, cache)
    {
        return Box::new(ctx);
    }

    if engine == SyntaxEngine::Syntect {
        tracing::debug!(
            language = buffer.file_type().display_name(),
            "syntect has no syntax for language, using scanner"
        );
    }

    Box::new(ScanContext::new(buffer.lines(), table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileType;
    use tab_jump_core::Position;

    #[test]
    fn test_plain_text_has_no_string_syntax() {
        let buffer = DocumentBuffer::from_string("say \"hi\"");
        let tables = SyntaxTables::default();
        let syntax_set = SyntaxSet::load_defaults_newlines();

        let mut cache = ParseCache::default();

        let ctx = context_for(&buffer, &mut cache, &tables, &syntax_set, SyntaxEngine::Auto);
        assert!(!ctx.is_string_delimiter('"'));
    }

    #[test]
    fn test_code_uses_table_delimiters() {
        let buffer = DocumentBuffer::from_string("let s = \"hi\";")
            .with_file_type(FileType::Code("rust".into()));
        let tables = SyntaxTables::default();
        let syntax_set = SyntaxSet::load_defaults_newlines();

        for engine in [SyntaxEngine::Auto, SyntaxEngine::Syntect, SyntaxEngine::Scan] {
            let mut cache = ParseCache::default();
            let ctx = context_for(&buffer, &mut cache, &tables, &syntax_set, engine);
            assert!(ctx.is_string_delimiter('"'));
            assert_eq!(ctx.string_depth(Position::new(0, 11)), 1, "{engine:?}");
            assert_eq!(ctx.string_depth(Position::new(0, 8)), 0, "{engine:?}");
        }
    }
}
