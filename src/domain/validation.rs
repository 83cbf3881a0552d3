//! 書籍入力の制約表
//!
//! フィールドごとの制約を (フィールド, ルール) の表として持ち、
//! ストレージに触れる前にサービス層で評価する。
//! 最初に違反したフィールドとルールを`ValidationError`として返す。

use std::fmt;
use thiserror::Error;

use super::book::BookDraft;

/// フィールド名（APIのJSONキーと一致させる）
pub mod field {
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const ISBN: &str = "isbn";
    pub const PUBLISHED_YEAR: &str = "publishedYear";
    pub const QUERY: &str = "q";
    pub const PAGE_SIZE: &str = "size";
}

/// タイトル・著者の最大文字数
pub const MAX_TEXT_LENGTH: usize = 255;
/// ISBNの最小文字数（ISBN-10）
pub const ISBN_MIN_LENGTH: usize = 10;
/// ISBNの最大文字数（ISBN-13）
pub const ISBN_MAX_LENGTH: usize = 13;

/// 制約ルール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// 値が指定されていること
    Required,
    /// 空白のみでないこと
    NotBlank,
    /// 文字数が範囲内であること
    Length { min: usize, max: usize },
    /// 0以上であること
    NonNegative,
    /// 1以上であること
    Positive,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "must not be null"),
            Rule::NotBlank => write!(f, "must not be blank"),
            Rule::Length { min, max } if *min == 0 => {
                write!(f, "length must be at most {}", max)
            }
            Rule::Length { min, max } => write!(f, "length must be between {} and {}", min, max),
            Rule::NonNegative => write!(f, "must be greater than or equal to 0"),
            Rule::Positive => write!(f, "must be greater than 0"),
        }
    }
}

/// バリデーションエラー
///
/// 違反したフィールドとルールを保持する。表示形式は `field: message`。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {rule}")]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: Rule,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: Rule) -> Self {
        Self { field, rule }
    }
}

/// 評価モード
///
/// 登録時は必須チェックを含め、更新時は指定されたフィールドのみ検査する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// 検査対象の値
#[derive(Debug, Clone, Copy)]
enum Value<'a> {
    Absent,
    Text(&'a str),
    Integer(i32),
}

/// 書籍の制約表（評価順）
const BOOK_RULES: &[(&str, Rule)] = &[
    (field::TITLE, Rule::Required),
    (field::TITLE, Rule::NotBlank),
    (
        field::TITLE,
        Rule::Length {
            min: 0,
            max: MAX_TEXT_LENGTH,
        },
    ),
    (field::AUTHOR, Rule::Required),
    (field::AUTHOR, Rule::NotBlank),
    (
        field::AUTHOR,
        Rule::Length {
            min: 0,
            max: MAX_TEXT_LENGTH,
        },
    ),
    (
        field::ISBN,
        Rule::Length {
            min: ISBN_MIN_LENGTH,
            max: ISBN_MAX_LENGTH,
        },
    ),
    (field::PUBLISHED_YEAR, Rule::NonNegative),
];

fn value_of<'a>(draft: &'a BookDraft, name: &str) -> Value<'a> {
    let text = |v: &'a Option<String>| v.as_deref().map_or(Value::Absent, Value::Text);
    match name {
        field::TITLE => text(&draft.title),
        field::AUTHOR => text(&draft.author),
        field::ISBN => text(&draft.isbn),
        field::PUBLISHED_YEAR => draft.published_year.map_or(Value::Absent, Value::Integer),
        _ => Value::Absent,
    }
}

fn satisfies(rule: Rule, value: Value<'_>) -> bool {
    match (rule, value) {
        (Rule::Required, Value::Absent) => false,
        (_, Value::Absent) => true,
        (Rule::NotBlank, Value::Text(s)) => !s.trim().is_empty(),
        (Rule::Length { min, max }, Value::Text(s)) => {
            let len = s.chars().count();
            len >= min && len <= max
        }
        (Rule::NonNegative, Value::Integer(n)) => n >= 0,
        (Rule::Positive, Value::Integer(n)) => n > 0,
        _ => true,
    }
}

/// 書籍ドラフトを制約表に照らして検査する
///
/// # エラー
/// 最初に違反した (フィールド, ルール) を返す
pub fn validate_draft(draft: &BookDraft, mode: Mode) -> Result<(), ValidationError> {
    BOOK_RULES
        .iter()
        .filter(|(_, rule)| mode == Mode::Create || *rule != Rule::Required)
        .find(|(name, rule)| !satisfies(*rule, value_of(draft, name)))
        .map_or(Ok(()), |(name, rule)| Err(ValidationError::new(*name, *rule)))
}

/// 検索クエリを検査する（空白のみは不可）
pub fn validate_query(query: &str) -> Result<(), ValidationError> {
    if satisfies(Rule::NotBlank, Value::Text(query)) {
        Ok(())
    } else {
        Err(ValidationError::new(field::QUERY, Rule::NotBlank))
    }
}

/// ページサイズを検査する（1以上）
pub fn validate_page_size(size: u64) -> Result<(), ValidationError> {
    if size > 0 {
        Ok(())
    } else {
        Err(ValidationError::new(field::PAGE_SIZE, Rule::Positive))
    }
}
