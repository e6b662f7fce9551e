//! Offline fallback responses.
//!
//! When the chat endpoint cannot be reached, the client answers locally with
//! a canned reply so the session degrades instead of failing. Selection runs
//! a three-tier priority search over the case-normalized input: an explicit
//! emotion-keyword table first, then a negative-affect heuristic mapping to
//! the comfort pool, then the generic default pool. Within a pool the pick
//! is uniformly random.
//!
//! The response text is the service's own Korean copy.

use rand::seq::SliceRandom;

use crate::core::message::ConversationStyle;

const DEFAULT_RESPONSES: &[&str] = &[
    "안녕하세요. 현재 서버 연결이 원활하지 않아 기본 응답을 제공하고 있습니다. 조금 후에 다시 시도해주세요.",
    "오늘 어떤 기분이신가요? 지금 느끼시는 감정에 이름을 붙여보는 것은 어떨까요?",
    "감정을 표현하는 것은 중요한 자기 돌봄의 첫 걸음이에요. 오늘 하루는 어떠셨나요?",
    "마음속에 있는 생각을 글로 표현하면 정리가 될 때가 있어요. 어떤 생각이 떠오르시나요?",
    "때로는 아무 말도 하지 않고 그냥 함께 있는 것만으로도 위로가 될 수 있어요. 조용히 함께하겠습니다.",
    "감정은 파도처럼 오고 가는 것이 자연스러워요. 지금 느끼는 감정도 언젠가는 지나갈 거예요.",
    "오늘 하루 중 가장 기억에 남는 순간은 무엇인가요?",
    "작은 것에 감사하는 습관은 행복감을 높여준다고 해요. 오늘 감사한 일이 있으셨나요?",
];

const COMFORT_RESPONSES: &[&str] = &[
    "힘든 시간을 보내고 계신 것 같아요. 그런 감정이 드는 것은 매우 자연스러운 일이에요.",
    "지금 느끼시는 감정이 무엇이든, 그것은 유효하고 중요한 신호예요. 스스로를 잘 돌봐주세요.",
    "때로는 그냥 쉬어가는 것도 필요해요. 자신에게 충분한 휴식을 허락해주세요.",
    "모든 감정은 파도처럼 오고 가는 것이에요. 이 순간의 어려움도 언젠가는 지나갈 거예요.",
    "누구나 힘든 시간을 겪기 마련이에요. 혼자가 아니라는 것을 기억해주세요.",
];

const KEYWORD_RESPONSES: &[(&str, &[&str])] = &[
    (
        "불안",
        &[
            "불안한 마음이 드실 때는 깊게 숨을 들이마시고 천천히 내쉬는 것이 도움이 될 수 있어요.",
            "불안감이 느껴질 때는 지금 이 순간에 집중하는 것이 도움이 돼요. 주변의 다섯 가지를 보고, 네 가지를 만지고, 세 가지 소리를 듣고, 두 가지 냄새를 맡고, 한 가지 맛을 느껴보세요.",
            "불안은 미래에 대한 걱정에서 오는 경우가 많아요. 지금 이 순간에 집중해보는 건 어떨까요?",
        ],
    ),
    (
        "슬픔",
        &[
            "슬픔은 우리가 무언가를 소중히 여겼다는 증거예요. 그 감정을 있는 그대로 느껴보는 것도 괜찮아요.",
            "슬픈 감정이 들 때는 자신에게 더 많은 위로와 이해를 베풀어주세요.",
            "슬픔은 자연스러운 감정이에요. 억지로 참거나 무시하지 말고 충분히 느껴주세요.",
        ],
    ),
    (
        "화남",
        &[
            "화가 날 때는 잠시 깊게 숨을 쉬고, 10까지 천천히 세어보는 것이 도움이 될 수 있어요.",
            "화나는 감정도 중요한 신호예요. 그 감정의 원인을 살펴보는 것이 도움이 될 수 있어요.",
            "화는 종종 우리의 경계나 가치가 침해받았을 때 생기는 자연스러운 반응이에요.",
        ],
    ),
    (
        "행복",
        &[
            "행복한 순간을 충분히 음미하고 기억해두면, 어려운 시간을 지날 때 힘이 될 수 있어요.",
            "작은 행복에도 감사하는 마음을 갖는 것은 기쁨을 오래 간직하는 비결이에요.",
            "행복감을 느낄 때 그 순간을 온전히 즐기는 것이 중요해요.",
        ],
    ),
    (
        "감사",
        &[
            "감사하는 마음은 긍정적인 에너지를 가져와요. 오늘 감사한 일을 적어보는 것은 어떨까요?",
            "작은 것에도 감사하는 습관은 우리의 관점을 변화시킬 수 있어요.",
            "감사함을 표현하는 것은 자신과 상대방 모두에게 기쁨을 줄 수 있어요.",
        ],
    ),
];

const NEGATIVE_MARKERS: &[&str] = &[
    "슬프", "우울", "불안", "걱정", "화나", "짜증", "힘들", "괴롭", "외롭",
];

/// Pick a canned reply for `text`. Pure apart from the random pool pick; the
/// style only affects greetings, not replies, matching the service.
pub fn fallback_response(text: &str, _style: ConversationStyle) -> &'static str {
    let lower = text.to_lowercase();

    for (keyword, responses) in KEYWORD_RESPONSES {
        if lower.contains(keyword) {
            return pick(responses);
        }
    }

    if NEGATIVE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return pick(COMFORT_RESPONSES);
    }

    pick(DEFAULT_RESPONSES)
}

/// Greeting shown when a session starts. Total over the style enum.
pub fn style_greeting(style: ConversationStyle) -> &'static str {
    match style {
        ConversationStyle::Cheerful => {
            "안녕하세요! 오늘 기분이 어떠세요? 함께 이야기 나눠볼까요? ✨"
        }
        ConversationStyle::Calm => {
            "안녕하세요. 오늘은 어떤 마음으로 찾아오셨나요? 편안하게 이야기 나누어 보시겠어요?"
        }
        ConversationStyle::Wise => {
            "반갑습니다. 오늘 마음의 날씨는 어떠신지요? 천천히 이야기 나누어 보면 좋겠습니다."
        }
        ConversationStyle::Default => {
            "안녕하세요. 마음돌봄이가 함께합니다. 오늘은 어떤 이야기를 나누고 싶으신가요?"
        }
    }
}

fn pick(pool: &'static [&'static str]) -> &'static str {
    pool.choose(&mut rand::thread_rng()).copied().unwrap_or(
        "안녕하세요. 현재 서버 연결이 원활하지 않습니다. 조금 후에 다시 시도해주세요.",
    )
}
