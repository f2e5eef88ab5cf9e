//! テンプレートレジストリ
//!
//! テンプレートは静的なデータとして定義する。テンプレートを追加する場合は
//! `TEMPLATES` にエントリを1件追加するだけでよい（分岐の追加は不要）。
//!
//! リクエスト文字列は `pattern` 中の `{fieldName}` を入力値で置換して作る。
//! 空欄（空白のみを含む）の項目は `EMPTY_FIELD_SENTINEL` に置き換える。
//! 全テンプレートで同じ規則を使うので、プロンプトの構造は入力によらず一定。

use crate::error::{Error, Result};
use crate::form::FormState;
use crate::prompts::{
    BRAND_VOICE_BRIEF, EDIT_RULES, IMAGE_BRIEF, LETTER_BRIEF, POEM_BRIEF, POLISH_BRIEF,
    PROMPT_BRIEF, SOCIAL_POST_BRIEF, SPEECH_BRIEF, STORY_BRIEF, SYSTEM_PROMPT,
};
use regex::{Captures, Regex};

/// 空欄項目の代替文字列
pub const EMPTY_FIELD_SENTINEL: &str = "None specified";

/// 生成の種類（送信先エンドポイントを決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Text,
    Image,
}

/// テンプレートのカテゴリ（表示順 = 宣言順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Creative,
    Personal,
    Business,
    Tools,
    Visual,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Creative,
        Category::Personal,
        Category::Business,
        Category::Tools,
        Category::Visual,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Creative => "Creative Writing",
            Category::Personal => "Personal",
            Category::Business => "Business",
            Category::Tools => "Writing Tools",
            Category::Visual => "Visual",
        }
    }
}

/// 入力欄の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Select(&'static [&'static str]),
}

/// プロフィールから事前入力する項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefill {
    BusinessName,
}

/// 入力欄の定義
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub prefill: Option<Prefill>,
}

impl FieldSpec {
    /// 初期値（明示がなければ選択肢の先頭、テキストは空）
    pub fn default_value(&self) -> &'static str {
        if let Some(value) = self.default {
            return value;
        }
        match self.kind {
            FieldKind::Select(options) => options.first().copied().unwrap_or(""),
            FieldKind::Text | FieldKind::TextArea => "",
        }
    }
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
        default: None,
        prefill: None,
    }
}

const fn business_name_field() -> FieldSpec {
    FieldSpec {
        prefill: Some(Prefill::BusinessName),
        ..field("businessName", "Business name", FieldKind::Text, true)
    }
}

/// テンプレート定義
#[derive(Debug)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub category: Category,
    pub kind: TemplateKind,
    pub fields: &'static [FieldSpec],
    pub brief: &'static str,
    /// 編集ルールをシステム指示に含めるか
    pub edit_rules: bool,
    pub pattern: &'static str,
}

impl Template {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// システム指示（共通ペルソナ + テンプレート固有の説明）
    pub fn instruction(&self) -> String {
        let mut instruction = format!("{}\n\n{}", SYSTEM_PROMPT, self.brief);
        if self.edit_rules {
            instruction.push_str("\n\n");
            instruction.push_str(EDIT_RULES);
        }
        instruction
    }
}

/// カテゴリ別のテンプレート一覧
#[derive(Debug, Clone)]
pub struct TemplateGroup {
    pub category: Category,
    pub templates: Vec<&'static Template>,
}

/// buildPromptの出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub instruction: String,
    pub request: String,
}

const STORY_MOODS: &[&str] = &["Hopeful", "Melancholic", "Tense", "Whimsical", "Dark"];
const POEM_FORMS: &[&str] = &["Free verse", "Sonnet", "Haiku", "Limerick", "Ballad"];
const POEM_TONES: &[&str] = &["Reflective", "Joyful", "Mournful", "Romantic", "Defiant"];
const LETTER_TYPES: &[&str] = &[
    "Apology",
    "Thank You",
    "Boundary",
    "Love",
    "Resignation",
    "Condolence",
];
const LETTER_TONES: &[&str] = &[
    "Warm",
    "Deeply regretful",
    "Firm but kind",
    "Formal",
    "Playful",
];
const SPEECH_LENGTHS: &[&str] = &["1 minute", "3 minutes", "5 minutes", "10 minutes"];
const PLATFORMS: &[&str] = &["Instagram", "LinkedIn", "X", "Facebook", "TikTok"];
const TARGET_MODELS: &[&str] = &[
    "General chat assistant",
    "Image generator",
    "Coding assistant",
];
const POLISH_FOCUS: &[&str] = &["Clarity", "Pacing", "Impact", "Structure"];
const YES_NO: &[&str] = &["No", "Yes"];
const IMAGE_STYLES: &[&str] = &[
    "Photorealistic",
    "Watercolor",
    "Ink illustration",
    "Cinematic",
    "Minimalist",
];

/// テンプレートカタログ（起動時に確定し、変更しない）
pub static TEMPLATES: &[Template] = &[
    Template {
        id: "story",
        name: "Story Starter",
        icon: "BookOpen",
        category: Category::Creative,
        kind: TemplateKind::Text,
        fields: &[
            field("premise", "Premise", FieldKind::TextArea, true),
            field("mood", "Mood", FieldKind::Select(STORY_MOODS), false),
            field("details", "Details", FieldKind::TextArea, false),
        ],
        brief: STORY_BRIEF,
        edit_rules: false,
        pattern: "Premise: {premise}, Mood: {mood}, Details: {details}",
    },
    Template {
        id: "poem",
        name: "Poem",
        icon: "Feather",
        category: Category::Creative,
        kind: TemplateKind::Text,
        fields: &[
            field("subject", "Subject", FieldKind::Text, true),
            field("form", "Form", FieldKind::Select(POEM_FORMS), false),
            field("tone", "Tone", FieldKind::Select(POEM_TONES), false),
            field("imagery", "Imagery to include", FieldKind::TextArea, false),
        ],
        brief: POEM_BRIEF,
        edit_rules: false,
        pattern: "Subject: {subject}, Form: {form}, Tone: {tone}, Imagery to include: {imagery}",
    },
    Template {
        id: "letter",
        name: "Heartfelt Letter",
        icon: "Mail",
        category: Category::Personal,
        kind: TemplateKind::Text,
        fields: &[
            field("letterType", "Letter type", FieldKind::Select(LETTER_TYPES), true),
            field("recipient", "Recipient", FieldKind::Text, true),
            field("coreMessage", "Core message", FieldKind::TextArea, true),
            field("tone", "Tone", FieldKind::Select(LETTER_TONES), false),
        ],
        brief: LETTER_BRIEF,
        edit_rules: false,
        pattern: "Letter type: {letterType}, Recipient: {recipient}, Core message: {coreMessage}, Tone: {tone}",
    },
    Template {
        id: "speech",
        name: "Speech",
        icon: "Mic",
        category: Category::Personal,
        kind: TemplateKind::Text,
        fields: &[
            field("occasion", "Occasion", FieldKind::Text, true),
            field("audience", "Audience", FieldKind::Text, false),
            field("keyPoints", "Key points", FieldKind::TextArea, true),
            FieldSpec {
                default: Some("3 minutes"),
                ..field("length", "Length", FieldKind::Select(SPEECH_LENGTHS), false)
            },
        ],
        brief: SPEECH_BRIEF,
        edit_rules: false,
        pattern: "Occasion: {occasion}, Audience: {audience}, Key points: {keyPoints}, Length: {length}",
    },
    Template {
        id: "brand_voice",
        name: "Brand Voice",
        icon: "Megaphone",
        category: Category::Business,
        kind: TemplateKind::Text,
        fields: &[
            business_name_field(),
            field("industry", "Industry", FieldKind::Text, false),
            field("audience", "Target audience", FieldKind::Text, true),
            field("values", "Core values", FieldKind::TextArea, false),
            field("topic", "Sample topic", FieldKind::Text, false),
        ],
        brief: BRAND_VOICE_BRIEF,
        edit_rules: false,
        pattern: "Business: {businessName}, Industry: {industry}, Audience: {audience}, Values: {values}, Sample topic: {topic}",
    },
    Template {
        id: "social_post",
        name: "Social Post",
        icon: "Share2",
        category: Category::Business,
        kind: TemplateKind::Text,
        fields: &[
            business_name_field(),
            field("platform", "Platform", FieldKind::Select(PLATFORMS), false),
            field("topic", "Topic", FieldKind::TextArea, true),
            field("callToAction", "Call to action", FieldKind::Text, false),
        ],
        brief: SOCIAL_POST_BRIEF,
        edit_rules: false,
        pattern: "Business: {businessName}, Platform: {platform}, Topic: {topic}, Call to action: {callToAction}",
    },
    Template {
        id: "prompt",
        name: "Prompt Engineer",
        icon: "Wand2",
        category: Category::Tools,
        kind: TemplateKind::Text,
        fields: &[
            field("goal", "Goal", FieldKind::TextArea, true),
            field("targetModel", "Target model", FieldKind::Select(TARGET_MODELS), false),
            field("context", "Context", FieldKind::TextArea, false),
            field("outputFormat", "Output format", FieldKind::Text, false),
        ],
        brief: PROMPT_BRIEF,
        edit_rules: false,
        pattern: "Goal: {goal}, Target model: {targetModel}, Context: {context}, Output format: {outputFormat}",
    },
    Template {
        id: "polish",
        name: "Draft Polish",
        icon: "PenTool",
        category: Category::Tools,
        kind: TemplateKind::Text,
        fields: &[
            field("draft", "Draft", FieldKind::TextArea, true),
            field("focus", "Focus", FieldKind::Select(POLISH_FOCUS), false),
            field("restructure", "Permission to restructure", FieldKind::Select(YES_NO), false),
        ],
        brief: POLISH_BRIEF,
        edit_rules: true,
        pattern: "Draft: {draft}, Focus: {focus}, Permission to restructure: {restructure}",
    },
    Template {
        id: "image",
        name: "Image Studio",
        icon: "Image",
        category: Category::Visual,
        kind: TemplateKind::Image,
        fields: &[
            field("subject", "Description", FieldKind::TextArea, true),
            field("style", "Style", FieldKind::Select(IMAGE_STYLES), false),
            field("colors", "Color palette", FieldKind::Text, false),
        ],
        brief: IMAGE_BRIEF,
        edit_rules: false,
        pattern: "{subject}, in a {style} style, color palette: {colors}",
    },
];

lazy_static::lazy_static! {
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").unwrap();
}

/// カテゴリ順にテンプレート一覧を返す（空のカテゴリは含めない）
pub fn list_templates() -> Vec<TemplateGroup> {
    Category::ALL
        .iter()
        .map(|&category| TemplateGroup {
            category,
            templates: TEMPLATES.iter().filter(|t| t.category == category).collect(),
        })
        .filter(|group| !group.templates.is_empty())
        .collect()
}

/// IDからテンプレートを取得
pub fn get_template(id: &str) -> Result<&'static Template> {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

/// パターン中の `{name}` をすべて列挙
pub fn placeholders(pattern: &str) -> Vec<&str> {
    PLACEHOLDER_RE
        .captures_iter(pattern)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// プロンプト組み立て
///
/// 同じFormStateからは常に同じ文字列を返す。
pub fn build_prompt(template: &Template, form: &FormState) -> BuiltPrompt {
    let request = PLACEHOLDER_RE
        .replace_all(template.pattern, |caps: &Captures| {
            let value = form.get(&caps[1]).map(str::trim).unwrap_or("");
            if value.is_empty() {
                EMPTY_FIELD_SENTINEL.to_string()
            } else {
                value.to_string()
            }
        })
        .into_owned();

    BuiltPrompt {
        instruction: template.instruction(),
        request,
    }
}

/// 未入力の必須項目（ラベル）を返す
pub fn missing_required(template: &Template, form: &FormState) -> Vec<String> {
    template
        .fields
        .iter()
        .filter(|f| f.required && form.is_blank(f.name))
        .map(|f| f.label.to_string())
        .collect()
}

/// 必須項目チェック（送信時のみ実行）
pub fn validate_required(template: &Template, form: &FormState) -> Result<()> {
    let missing = missing_required(template, form);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(missing))
    }
}
