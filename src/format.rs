//! Text and JSON rendering of tree, tab, file and compile output.

use crate::compiler::{CompileResult, LogEntry, LogLevel};
use crate::store::ProjectStore;
use crate::tree::FileNode;
use crate::types::NodeId;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Indented tree. Collapsed folders hide their children; the active file is
/// marked with `*` and other open files with `+`.
pub fn format_tree_text(store: &ProjectStore) -> String {
    let mut out = String::new();
    if store.tree().is_empty() {
        out.push_str("Project is empty.\n");
        return out;
    }
    for root in store.tree().roots() {
        write_node(store, root, 0, &mut out);
    }
    out
}

fn write_node(store: &ProjectStore, node: &FileNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if node.is_folder() {
        let marker = if node.expanded { "▾" } else { "▸" };
        let hidden = if node.expanded || node.children.is_empty() {
            String::new()
        } else {
            format!(" ({} hidden)", node.children.len())
        };
        out.push_str(&format!(
            "{}{} {}/{}\n",
            indent,
            marker,
            node.name.blue().bold(),
            hidden.dimmed()
        ));
        if node.expanded {
            for child in &node.children {
                write_node(store, child, depth + 1, out);
            }
        }
        return;
    }

    let tabs = store.tabs();
    if tabs.active() == Some(node.id) {
        out.push_str(&format!("{}* {}\n", indent, node.name.green().bold()));
    } else if tabs.is_open(node.id) {
        out.push_str(&format!("{}+ {}\n", indent, node.name.green()));
    } else {
        out.push_str(&format!("{}  {}\n", indent, node.name));
    }
}

pub fn format_files_text(files: &[&FileNode]) -> String {
    if files.is_empty() {
        return "No files.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Language", "Bytes", "Id"]);
    for file in files {
        table.add_row(vec![
            file.path.clone(),
            file.language.clone().unwrap_or_else(|| "-".to_string()),
            file.text().len().to_string(),
            file.id.short(),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_files_json(files: &[&FileNode]) -> Result<String, serde_json::Error> {
    let entries: Vec<_> = files
        .iter()
        .map(|file| {
            json!({
                "id": file.id.to_string(),
                "path": file.path,
                "language": file.language,
                "bytes": file.text().len(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "total": files.len(), "files": entries }))
}

pub fn format_tabs_text(store: &ProjectStore) -> String {
    let open = store.open_files();
    if open.is_empty() {
        return "No open tabs.\n".to_string();
    }
    let active = store.tabs().active();
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Path", "Active"]);
    for (index, file) in open.iter().enumerate() {
        let marker = if active == Some(file.id) { "yes" } else { "" };
        table.add_row(vec![
            (index + 1).to_string(),
            file.path.clone(),
            marker.to_string(),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_tabs_json(store: &ProjectStore) -> Result<String, serde_json::Error> {
    let path_of = |id: NodeId| store.tree().get(id).map(|n| n.path.clone());
    let tabs: Vec<_> = store
        .open_files()
        .iter()
        .map(|file| json!({ "id": file.id.to_string(), "path": file.path }))
        .collect();
    serde_json::to_string_pretty(&json!({
        "tabs": tabs,
        "active": store.tabs().active().and_then(path_of),
        "selected": store.tabs().selected().and_then(path_of),
    }))
}

pub fn format_log_entry(entry: &LogEntry) -> String {
    match entry.level {
        LogLevel::Info => entry.to_string(),
        LogLevel::Warn => format!("{}", entry.to_string().yellow()),
        LogLevel::Error => format!("{}", entry.to_string().red()),
    }
}

pub fn format_logs_text(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return "No compile logs.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format_log_entry(entry));
        out.push('\n');
    }
    out
}

pub fn format_compile_text(result: &CompileResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Compile")));
    out.push_str(&format_logs_text(&result.logs));
    out.push('\n');
    match (result.html(), result.error()) {
        (Some(html), _) => out.push_str(&format!(
            "{} ({} bytes)\n",
            "Compiled successfully".green(),
            html.len()
        )),
        (None, Some(message)) => {
            out.push_str(&format!("{} {}\n", "Compile failed:".red().bold(), message))
        }
        (None, None) => {}
    }
    out
}

/// Outcome and logs; the document itself is left out
pub fn format_compile_json(result: &CompileResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "success": result.is_success(),
        "error": result.error(),
        "bytes": result.html().map(str::len),
        "logs": result.logs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::store::scaffold::starter_project;
    use crate::tree::FileTree;

    #[test]
    fn test_tree_text_hides_collapsed_children() {
        let mut store = ProjectStore::with_tree(starter_project());
        let text = format_tree_text(&store);
        assert!(text.contains("main.ts"));

        let src = store.tree().find_by_path("src").unwrap().id;
        store.toggle_folder(src).unwrap();
        let text = format_tree_text(&store);
        assert!(!text.contains("main.ts"));
        assert!(text.contains("hidden"));
    }

    #[test]
    fn test_tree_text_marks_active_file() {
        let mut store = ProjectStore::with_tree(starter_project());
        let main = store.tree().find_by_path("src/main.ts").unwrap().id;
        store.select_file(main).unwrap();
        let text = format_tree_text(&store);
        let line = text.lines().find(|l| l.contains("main.ts")).unwrap();
        assert!(line.trim_start().starts_with('*'));
    }

    #[test]
    fn test_files_json_contract() {
        let tree = starter_project();
        let files = tree.files();
        let parsed: serde_json::Value =
            serde_json::from_str(&format_files_json(&files).unwrap()).unwrap();
        assert_eq!(parsed["total"].as_u64(), Some(files.len() as u64));
        let first = &parsed["files"][0];
        assert!(first["path"].as_str().is_some());
        assert!(first["bytes"].as_u64().is_some());
    }

    #[test]
    fn test_compile_json_contract() {
        let result = Compiler::default().compile(&FileTree::new());
        let parsed: serde_json::Value =
            serde_json::from_str(&format_compile_json(&result).unwrap()).unwrap();
        assert_eq!(parsed["success"], json!(false));
        assert!(parsed["error"].as_str().unwrap().contains("not found"));
        assert_eq!(parsed["logs"].as_array().unwrap().last().unwrap()["level"], json!("error"));
    }

    #[test]
    fn test_empty_outputs() {
        let store = ProjectStore::new();
        assert_eq!(format_tree_text(&store), "Project is empty.\n");
        assert_eq!(format_tabs_text(&store), "No open tabs.\n");
        assert_eq!(format_files_text(&[]), "No files.\n");
    }
}
