//! Command implementations

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use splice_core::indent::default_unit;
use splice_core::{
    EngineConfig, Frontend, Language, ParseTree, ResultExt, SyntaxKind, Tree, TreeFactory,
};
use tracing::{debug, info};

use crate::Input;
use crate::report;

/// Hands out a parse tree read from disk
struct JsonFrontend {
    language: Language,
    parse_tree: ParseTree,
}

impl Frontend for JsonFrontend {
    fn language(&self) -> Language {
        self.language
    }

    fn parse(&self, _source: &str) -> splice_core::Result<ParseTree> {
        Ok(self.parse_tree.clone())
    }
}

fn language_of(input: &Input) -> anyhow::Result<Language> {
    if let Some(language) = input.language {
        return Ok(language);
    }
    match input.source.extension().and_then(|ext| ext.to_str()) {
        Some("py") | Some("pyi") => Ok(Language::Python),
        Some("js") | Some("mjs") | Some("cjs") | Some("jsx") => Ok(Language::JavaScript),
        _ => bail!(
            "cannot infer the language of '{}', pass --language",
            input.source.display()
        ),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn load(config: &EngineConfig, input: &Input) -> anyhow::Result<(String, Arc<Tree>)> {
    let language = language_of(input)?;
    let source = read(&input.source)?;
    let parse_tree = ParseTree::from_json(&read(&input.tree)?)
        .with_context(|| format!("in '{}'", input.tree.display()))?;
    debug!(%language, path = %input.source.display(), "loading tree");

    let mut factory = TreeFactory::new(config);
    factory.register(Box::new(JsonFrontend {
        language,
        parse_tree,
    }));
    let tree = factory.parse_shared(&source, language)?;
    Ok((source, tree))
}

pub fn dump(config: &EngineConfig, input: &Input, json: bool) -> anyhow::Result<()> {
    let (_, tree) = load(config, input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tree.debug_nodes())?);
    } else {
        println!("{}", tree.debug_dump());
    }
    Ok(())
}

pub fn check(config: &EngineConfig, input: &Input) -> anyhow::Result<()> {
    let (source, tree) = load(config, input)?;
    let text = tree.text();
    if text != source && !config.construction.strip_unattributed_tokens {
        bail!(
            "round trip changed the source ({} bytes in, {} bytes out)",
            source.len(),
            text.len()
        );
    }
    if let Some(error) = tree.syntax_error() {
        let path = input.source.display().to_string();
        eprint!("{}", report::syntax_error(&path, &source, &error));
        bail!(
            "syntax error at line {}, column {}",
            error.line + 1,
            error.column + 1
        );
    }

    info!(tokens = tree.tokens().len(), "check passed");
    println!(
        "ok: {} tokens, {} comments, indentation {:?}",
        tree.tokens().len(),
        tree.comments().len(),
        default_unit(&tree)
    );
    Ok(())
}

pub fn lines(config: &EngineConfig, input: &Input, kind: SyntaxKind) -> anyhow::Result<()> {
    let (_, tree) = load(config, input)?;
    let lists = tree.find_all(kind);
    if lists.is_empty() {
        bail!("no {kind} node in '{}'", input.source.display());
    }
    for list in lists {
        let range = tree.range(list);
        // Non-list kinds are reported and skipped
        let Some(available) = tree.available_lines(list).recoverable()? else {
            continue;
        };
        println!(
            "{kind} {}..{}: {available:?}",
            u32::from(range.start()),
            u32::from(range.end())
        );
    }
    Ok(())
}
