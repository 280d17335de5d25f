//! Loading agent configuration (prompts + canned replies) from TOML.
//!
//! Every field has a built-in default, so a partial file only overrides what it
//! names. See `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Difficulty;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts and fallback messages used by the quiz generator and the tutor.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  // Quiz generation
  pub quiz_system: String,
  pub quiz_user_template: String,
  pub quiz_topic_basic: String,
  pub quiz_topic_advanced: String,
  // Tutor
  pub tutor_system: String,
  pub tutor_empty_reply: String,
  pub tutor_missing_key_reply: String,
  pub tutor_unavailable_reply: String,
}

impl Prompts {
  pub fn quiz_topic(&self, difficulty: Difficulty) -> &str {
    match difficulty {
      Difficulty::Basic => &self.quiz_topic_basic,
      Difficulty::Advanced => &self.quiz_topic_advanced,
    }
  }
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are an expert English grammar teacher for Korean students. Always output strictly structured JSON.".into(),
      quiz_user_template: "Create {count} high-quality multiple-choice questions about English Gerunds (동명사) for 3rd-year middle school students in South Korea.\n\nTopic: {topic}\n\nRequirements:\n1. Questions should be educational and appropriate for the level.\n2. Ensure exactly 4 options per question.\n3. Explanation must be in Korean and helpful for students.\n4. Output strictly valid JSON matching the schema.".into(),
      quiz_topic_basic: "Focus on: Basic usage as Subject/Object/Complement, and verbs taking only gerunds (enjoy, finish, mind, keep, avoid).".into(),
      quiz_topic_advanced: "Focus on: Distinction between Gerunds and Participles, verbs with meaning changes (remember/forget/try/stop), and prepositions + gerunds.".into(),
      tutor_system: "당신은 'GerundBot'입니다. 한국의 중학교 3학년 학생들에게 영문법 '동명사(Gerund)'를 가르치는 AI 튜터입니다.\n\n성격:\n- 매우 친절하고 에너지 넘치는 선생님\n- 이모지를 적절히 사용하여 딱딱하지 않게 대화\n- 학생이 틀려도 격려하고 다시 설명해줌\n\n가이드라인:\n1. 동명사 외의 질문이 들어오면 \"지금은 동명사에 대해 이야기해볼까?\"라고 부드럽게 유도하세요.\n2. 설명은 최대한 쉬운 예문(중학 필수 단어)을 사용하세요.\n3. 핵심 개념: 명사적 용법, 동명사 vs 현재분사, 동명사 목적어 취하는 동사 등.\n4. 답변 길이는 너무 길지 않게, 모바일에서 읽기 편하게 끊어주세요.".into(),
      tutor_empty_reply: "미안해, 다시 한번 말해줄래? 😅".into(),
      tutor_missing_key_reply: "API 키 설정 오류가 발생했어. (API Key Missing)".into(),
      tutor_unavailable_reply: "어라? 연결에 문제가 생긴 것 같아. 잠시 후에 다시 시도해줘! 🚧".into(),
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "gerund_master", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "gerund_master", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "gerund_master", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_file_keeps_other_defaults() {
    let cfg = parse_agent_config(
      r#"
[prompts]
tutor_empty_reply = "한 번 더 말해줘!"
"#,
    )
    .expect("parse");
    assert_eq!(cfg.prompts.tutor_empty_reply, "한 번 더 말해줘!");
    assert_eq!(cfg.prompts.quiz_system, Prompts::default().quiz_system);
  }

  #[test]
  fn topics_differ_by_difficulty() {
    let p = Prompts::default();
    assert!(p.quiz_topic(Difficulty::Basic).contains("enjoy"));
    assert!(p.quiz_topic(Difficulty::Advanced).contains("Participles"));
  }

  #[test]
  fn empty_file_is_all_defaults() {
    let cfg = parse_agent_config("").expect("parse");
    assert!(cfg.prompts.quiz_user_template.contains("{topic}"));
  }
}
