//! Built-in content: concept cards, the tutor's welcome line, suggested questions.

use crate::domain::{CardKind, LearningCard};

pub const WELCOME_MESSAGE_ID: &str = "welcome";

pub const WELCOME_TEXT: &str =
  "안녕! 나는 동명사 척척박사 GerundBot이야. 🤖\n동명사에 대해 헷갈리는 게 있다면 무엇이든 물어봐!";

/// Conversation starters shown under the chat box.
pub const CHAT_SUGGESTIONS: [&str; 5] = [
  "동명사가 뭐야?",
  "동명사와 현재분사 차이점 알려줘",
  "Enjoy 뒤에는 왜 ing가 와?",
  "동명사를 주어로 쓴 예문 보여줘",
  "투부정사랑 동명사는 뭐가 달라?",
];

fn card(title: &str, kind: CardKind, content: &str, examples: &[&str]) -> LearningCard {
  LearningCard {
    title: title.into(),
    kind,
    content: content.into(),
    examples: examples.iter().map(|e| e.to_string()).collect(),
  }
}

/// The static concept reference.
pub fn concept_cards() -> Vec<LearningCard> {
  vec![
    card(
      "동명사(Gerund)란?",
      CardKind::Concept,
      "동사원형 + -ing 형태로, 동사의 성질을 가지면서 '명사' 역할을 해요. 문장에서 주어, 목적어, 보어 자리에 들어갑니다.",
      &[
        "Running is good for health. (주어: 달리는 것은)",
        "My hobby is taking pictures. (보어: 사진 찍는 것이다)",
        "I started learning English. (목적어: 영어 배우는 것을)",
      ],
    ),
    card(
      "동명사 vs 현재분사 구별",
      CardKind::Concept,
      "형태는 같지만 역할이 달라요! 동명사는 '용도/목적(~하기 위한)', 현재분사는 '상태/진행(~하고 있는)'을 나타냅니다.",
      &[
        "🛏️ a sleeping bag (잠자기를 위한 가방 = 침낭) → 동명사",
        "👶 a sleeping baby (자고 있는 아기) → 현재분사",
        "💃 Look at the dancing girl. (춤추고 있는) → 현재분사",
      ],
    ),
    card(
      "동명사만 목적어로 쓰는 동사",
      CardKind::Usage,
      "시험에 가장 많이 나오는 내용! 이 동사들 뒤에는 to부정사가 오면 안 돼요.",
      &[
        "🔥 암기팁: MEGA PEP'S (Mind, Enjoy, Give up, Avoid, Practice, Escape, Postpone, Stop...)",
        "I enjoy playing soccer. (O)",
        "I enjoy to play soccer. (X)",
      ],
    ),
    card(
      "뜻이 달라지는 동사",
      CardKind::Tip,
      "뒤에 동명사가 오느냐, to부정사가 오느냐에 따라 의미가 달라져요. 문맥을 잘 봐야 해요!",
      &[
        "Remember meeting him (만난 것을 기억하다 - 과거)",
        "Remember to meet him (만날 것을 기억하다 - 미래)",
        "Stop smoking (담배를 끊다)",
        "Stop to smoke (담배 피우기 위해 멈추다)",
      ],
    ),
  ]
}
