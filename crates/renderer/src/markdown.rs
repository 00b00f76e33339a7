use envdash_api::{Composition, Prose};
use std::fmt::Write;

/// Markdown report for a composition.
///
/// Uses the backend's own `markdown_content`, else the `workflow` text, else
/// a report assembled from the individual fields.
pub fn composition_markdown(c: &Composition) -> String {
    let raw = c
        .markdown_content
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| c.workflow.clone().filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| build_report(c));
    unescape(&raw).trim().to_string()
}

/// Undo literal `\n`, `\"` and `\t` escapes left in LLM output.
pub fn unescape(s: &str) -> String {
    s.replace("\\n", "\n").replace("\\\"", "\"").replace("\\t", "\t")
}

fn build_report(c: &Composition) -> String {
    let mut md = String::new();
    let title = c
        .composition_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("Service composition");

    let _ = writeln!(md, "# {title}\n");

    if let Some(workflow) = &c.workflow {
        let _ = writeln!(md, "## Overview\n\n{workflow}\n");
    }

    if !c.services.is_empty() {
        md.push_str("## Services\n\n");
        for (i, service) in c.services.iter().enumerate() {
            let name = service.name.as_deref().unwrap_or("unnamed service");
            let _ = writeln!(md, "### {}. {name}\n", i + 1);
            if let Some(d) = &service.description {
                let _ = writeln!(md, "**Description**: {d}\n");
            }
            if let Some(e) = &service.endpoint {
                let _ = writeln!(md, "**Endpoint**: `{e}`\n");
            }
            if let Some(p) = &service.parameters {
                let json = serde_json::to_string_pretty(p).unwrap_or_default();
                let _ = writeln!(md, "**Parameters**:\n```json\n{json}\n```\n");
            }
        }
    }

    if let Some(plan) = &c.execution_plan {
        md.push_str("## Execution plan\n\n");
        if plan.is_list() {
            for (i, step) in plan.items().iter().enumerate() {
                let _ = writeln!(md, "{}. {step}", i + 1);
            }
            md.push('\n');
        } else {
            let _ = writeln!(md, "{plan}\n");
        }
    }

    if let Some(outcome) = &c.expected_outcome {
        let _ = writeln!(md, "## Expected outcome\n\n{outcome}\n");
    }

    if let Some(constraints) = &c.constraints_satisfied {
        md.push_str("## Constraints satisfied\n\n");
        write_checklist(&mut md, constraints);
    }

    let details = serde_json::to_string_pretty(c).unwrap_or_default();
    let _ = writeln!(md, "## Technical details\n\n```json\n{details}\n```\n");

    md
}

fn write_checklist(md: &mut String, constraints: &Prose) {
    if constraints.is_list() {
        for item in constraints.items() {
            let _ = writeln!(md, "- ✅ {item}");
        }
        md.push('\n');
    } else {
        let _ = writeln!(md, "{constraints}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn composition(v: serde_json::Value) -> Composition {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn markdown_content_wins_and_is_unescaped() {
        let c = composition(json!({
            "markdown_content": "# Plan\\n\\nSay \\\"hi\\\"\\n",
            "workflow": "ignored"
        }));
        assert_eq!(composition_markdown(&c), "# Plan\n\nSay \"hi\"");
    }

    #[test]
    fn workflow_is_used_verbatim() {
        let c = composition(json!({ "workflow": "  step one\\tthen two  " }));
        assert_eq!(composition_markdown(&c), "step one\tthen two");
    }

    #[test]
    fn report_is_built_from_fields() {
        let c = composition(json!({
            "composition_id": "comp_7",
            "services": [
                { "name": "hvac", "description": "air conditioning", "endpoint": "/hvac", "parameters": { "target": 22 } },
                { "description": "no name" }
            ],
            "execution_plan": ["read sensors", "cool down"],
            "expected_outcome": "room at 22°C",
            "constraints_satisfied": ["quiet"]
        }));
        let md = composition_markdown(&c);

        assert!(md.starts_with("# comp_7\n"));
        assert!(!md.contains("## Overview"));
        assert!(md.contains("### 1. hvac\n\n**Description**: air conditioning"));
        assert!(md.contains("**Endpoint**: `/hvac`"));
        assert!(md.contains("\"target\": 22"));
        assert!(md.contains("### 2. unnamed service"));
        assert!(md.contains("1. read sensors\n2. cool down\n"));
        assert!(md.contains("## Expected outcome\n\nroom at 22°C"));
        assert!(md.contains("- ✅ quiet"));
        assert!(md.contains("## Technical details\n\n```json\n{"));
    }

    #[test]
    fn textual_plan_is_kept_as_paragraph() {
        let c = composition(json!({ "execution_plan": "do it all at once", "constraints_satisfied": "all" }));
        let md = composition_markdown(&c);
        assert!(md.starts_with("# Service composition"));
        assert!(md.contains("## Execution plan\n\ndo it all at once\n"));
        assert!(md.contains("## Constraints satisfied\n\nall\n"));
    }
}
