//! Inked Ghost-Writer
//!
//! 生成パイプライン（プロンプト組み立て → API呼び出し・リトライ → 保存）と
//! それを操作するCLI。I/Oを持たない部分は `inked_common` にある。

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod generator;
pub mod logging;
pub mod persistence;
