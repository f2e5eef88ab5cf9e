//! コンソール表示・対話入力
//!
//! 履歴・詳細は保存済みプロジェクトの読み取り専用ビュー。

use crate::error::{InkedError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dialoguer::{Input, Select};
use inked_common::{
    list_templates, Action, FieldKind, GenerationOutput, Project, Session, TemplateKind,
};
use std::path::Path;

/// 一覧に出す本文の最大文字数
const PREVIEW_CHARS: usize = 60;

/// テンプレート一覧
pub fn render_catalog() -> String {
    let mut out = String::new();
    for group in list_templates() {
        out.push_str(&format!("{}\n", group.category.label()));
        for template in group.templates {
            let kind = match template.kind {
                TemplateKind::Text => "text",
                TemplateKind::Image => "image",
            };
            out.push_str(&format!(
                "  {:<12} {} ({})\n",
                template.id, template.name, kind
            ));
        }
    }
    out
}

/// 本文の先頭を1行に縮める
pub fn preview(output: &GenerationOutput) -> String {
    match output {
        GenerationOutput::Text { text } => {
            let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if line.chars().count() > PREVIEW_CHARS {
                let head: String = line.chars().take(PREVIEW_CHARS).collect();
                format!("{}…", head)
            } else {
                line
            }
        }
        GenerationOutput::Image { base64 } => format!("[画像 {} bytes (base64)]", base64.len()),
    }
}

/// 履歴ビュー（渡された順に表示）
pub fn render_history(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "保存済みプロジェクトはありません\n".to_string();
    }
    projects
        .iter()
        .map(|p| {
            format!(
                "{}  {}  [{}] {}\n    {}\n",
                p.id,
                p.created_at.format("%Y-%m-%d %H:%M"),
                p.template_id,
                p.title,
                preview(&p.result)
            )
        })
        .collect()
}

/// 詳細ビュー
pub fn render_detail(project: &Project) -> String {
    let mut out = format!(
        "{}\nID: {}\nテンプレート: {}\n作成日時: {}\n\n入力:\n",
        project.title,
        project.id,
        project.template_id,
        project.created_at.to_rfc3339()
    );
    for (name, value) in project.inputs.iter() {
        out.push_str(&format!("  {}: {}\n", name, value));
    }
    out.push_str("\n結果:\n");
    match &project.result {
        GenerationOutput::Text { text } => out.push_str(text),
        GenerationOutput::Image { .. } => out.push_str(&preview(&project.result)),
    }
    out.push('\n');
    out
}

/// 生成結果をファイルへ書き出す（画像はBase64をデコードしてPNGで保存）
pub fn write_output(output: &GenerationOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match output {
        GenerationOutput::Text { text } => std::fs::write(path, text)?,
        GenerationOutput::Image { base64 } => {
            let bytes = STANDARD
                .decode(base64.as_bytes())
                .map_err(|e| inked_common::Error::Parse(format!("image bytes are not base64: {}", e)))?;
            std::fs::write(path, bytes)?;
        }
    }
    Ok(())
}

/// アクティブなテンプレートの各項目を対話式で入力
pub fn fill_form_interactively(session: &mut Session) -> Result<()> {
    let template = session.active_template();
    println!("📝 {}\n", template.name);

    for spec in template.fields {
        let current = session
            .active_form()?
            .get(spec.name)
            .unwrap_or_default()
            .to_string();
        let label = if spec.required {
            format!("{} *", spec.label)
        } else {
            spec.label.to_string()
        };

        let value = match spec.kind {
            FieldKind::Select(options) => {
                let default = options.iter().position(|o| *o == current).unwrap_or(0);
                let index = Select::new()
                    .with_prompt(label)
                    .items(options)
                    .default(default)
                    .interact()
                    .map_err(|e| InkedError::Prompt(e.to_string()))?;
                options[index].to_string()
            }
            FieldKind::Text | FieldKind::TextArea => Input::<String>::new()
                .with_prompt(label)
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| InkedError::Prompt(e.to_string()))?,
        };

        session.apply(Action::SetField {
            field: spec.name.to_string(),
            value,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use inked_common::FormState;
    use tempfile::tempdir;

    fn project(text: &str) -> Project {
        let mut inputs = FormState::default();
        inputs.set("recipient", "Jordan");
        Project {
            id: "0123456789abcdef".to_string(),
            user_id: "u1".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 18, 9, 30, 0).unwrap(),
            title: "Apology to Jordan".to_string(),
            template_id: "letter".to_string(),
            inputs,
            result: GenerationOutput::Text { text: text.to_string() },
        }
    }

    #[test]
    fn test_render_catalog_lists_every_template() {
        let catalog = render_catalog();
        for template in inked_common::TEMPLATES {
            assert!(catalog.contains(template.id), "{}", template.id);
        }
        assert!(catalog.contains("Creative Writing"));
        assert!(catalog.contains("(image)"));
    }

    #[test]
    fn test_preview_truncates_and_flattens() {
        let long = "word ".repeat(40);
        let p = preview(&GenerationOutput::Text { text: long });
        assert!(p.ends_with('…'));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);

        let short = preview(&GenerationOutput::Text { text: "Dear\nJordan,".to_string() });
        assert_eq!(short, "Dear Jordan,");
    }

    #[test]
    fn test_render_history_empty() {
        assert!(render_history(&[]).contains("ありません"));
    }

    #[test]
    fn test_render_history_and_detail() {
        let p = project("Dear Jordan, I am so sorry.");
        let history = render_history(std::slice::from_ref(&p));
        assert!(history.contains("0123456789abcdef"));
        assert!(history.contains("2026-01-18 09:30"));
        assert!(history.contains("Apology to Jordan"));

        let detail = render_detail(&p);
        assert!(detail.contains("recipient: Jordan"));
        assert!(detail.contains("Dear Jordan, I am so sorry."));
    }

    #[test]
    fn test_write_output_text_and_image() {
        let dir = tempdir().expect("Failed to create temp dir");

        let text_path = dir.path().join("letter.txt");
        write_output(&GenerationOutput::Text { text: "Dear Jordan,".to_string() }, &text_path).unwrap();
        assert_eq!(std::fs::read_to_string(&text_path).unwrap(), "Dear Jordan,");

        let image_path = dir.path().join("out").join("fox.png");
        let encoded = STANDARD.encode([0x89u8, b'P', b'N', b'G']);
        write_output(&GenerationOutput::Image { base64: encoded }, &image_path).unwrap();
        assert_eq!(std::fs::read(&image_path).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_write_output_invalid_base64() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("bad.png");
        let result = write_output(&GenerationOutput::Image { base64: "***".to_string() }, &path);
        assert!(matches!(
            result,
            Err(InkedError::Common(inked_common::Error::Parse(_)))
        ));
        assert!(!path.exists());
    }
}
