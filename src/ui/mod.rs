//! Terminal output helpers for the client dispatcher.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use is_terminal::IsTerminal;

use crate::client::{CallToolResult, ServerInfo, ToolDescriptor};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Render the advertised tools as a table.
pub fn tool_table(tools: &[ToolDescriptor]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tool", "Required parameters", "Description"]);

    for tool in tools {
        table.add_row(vec![
            tool.name.clone(),
            tool.required_params().join(", "),
            tool.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

/// Print the connection banner and tool list, as a table on a TTY and as
/// JSON otherwise (or when JSON output is forced).
pub fn print_tools(server: &ServerInfo, tools: &[ToolDescriptor], json: bool) {
    if json {
        let payload = serde_json::json!({
            "server": { "name": server.name, "version": server.version },
            "tools": tools,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
        );
        return;
    }

    println!(
        "Connected to {} v{}",
        server.name.bold(),
        server.version
    );
    if tools.is_empty() {
        println!("No tools advertised");
        return;
    }
    println!("{}", tool_table(tools));
}

/// Print a tool call result. Error results go to stderr in red when the
/// output is a terminal.
pub fn print_result(result: &CallToolResult) {
    let text = result.text();
    if result.is_error == Some(true) {
        if is_terminal() {
            eprintln!("{}", text.red());
        } else {
            eprintln!("{}", text);
        }
    } else {
        println!("{}", text);
    }
}
