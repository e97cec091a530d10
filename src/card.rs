use crate::lotto::{
    DrawResult, PRIZE_FIFTH, PRIZE_FIRST, PRIZE_FIRST_NEAR, PRIZE_FOURTH, PRIZE_SECOND,
    PRIZE_THIRD, RUNNING_BACK_THREE, RUNNING_BACK_TWO, RUNNING_FRONT_THREE,
};
use crate::platform::{
    FlexBox, FlexBubble, FlexButton, FlexComponent, FlexSeparator, FlexText, Message,
};

const CARD_TITLE: &str = "ผลสลากกินแบ่งรัฐบาล";
const FIRST_PRIZE_LABEL: &str = "รางวัลที่ 1";
const NEAR_PRIZE_LABEL: &str = "รางวัลข้างเคียงรางวัลที่ 1";
const DETAIL_LABEL: &str = "ดูผลรางวัลทั้งหมด";
const DEFAULT_DETAIL_URL: &str = "https://www.glo.or.th";
const PLACEHOLDER: &str = "-";

// The three running-number lines are always present, in this order.
const RUNNING_LINES: [(&str, &str); 3] = [
    (RUNNING_FRONT_THREE, "เลขหน้า 3 ตัว"),
    (RUNNING_BACK_THREE, "เลขท้าย 3 ตัว"),
    (RUNNING_BACK_TWO, "เลขท้าย 2 ตัว"),
];

// Secondary tiers in fixed priority order; emitted only when non-empty.
const SECONDARY_TIERS: [(&str, &str); 4] = [
    (PRIZE_SECOND, "รางวัลที่ 2"),
    (PRIZE_THIRD, "รางวัลที่ 3"),
    (PRIZE_FOURTH, "รางวัลที่ 4"),
    (PRIZE_FIFTH, "รางวัลที่ 5"),
];

const NUMBERS_PER_LINE: usize = 5;

/// Build the result card for a draw. Pure and deterministic: missing
/// sub-collections render as placeholders, never as errors.
pub fn result_card(draw: &DrawResult) -> Message {
    let headline = draw
        .prize(PRIZE_FIRST)
        .and_then(|p| p.number.first())
        .map(String::as_str)
        .unwrap_or(PLACEHOLDER);
    let date = draw
        .date
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER);

    let mut body = vec![
        FlexComponent::Text(FlexText::new(CARD_TITLE).weight("bold").size("lg")),
        FlexComponent::Text(
            FlexText::new(format!("งวดวันที่ {date}"))
                .size("sm")
                .color("#8c8c8c"),
        ),
        FlexComponent::Separator(FlexSeparator::new(Some("md"))),
        FlexComponent::Text(
            FlexText::new(FIRST_PRIZE_LABEL)
                .size("sm")
                .color("#8c8c8c")
                .margin("md"),
        ),
        FlexComponent::Text(FlexText::new(headline).weight("bold").size("xxl")),
    ];

    if let Some(near) = draw.prize(PRIZE_FIRST_NEAR).filter(|p| !p.number.is_empty()) {
        body.push(label_value(NEAR_PRIZE_LABEL, &near.number.join(" ")));
    }

    for (id, label) in RUNNING_LINES {
        let value = draw
            .running(id)
            .map(|r| r.number.join(" "))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        body.push(label_value(label, &value));
    }

    for (id, label) in SECONDARY_TIERS {
        let Some(tier) = draw.prize(id).filter(|p| !p.number.is_empty()) else {
            continue;
        };
        body.push(FlexComponent::Text(
            FlexText::new(label).size("sm").color("#8c8c8c").margin("md"),
        ));
        for chunk in tier.number.chunks(NUMBERS_PER_LINE) {
            body.push(FlexComponent::Text(
                FlexText::new(chunk.join(" ")).size("sm").wrap(),
            ));
        }
    }

    let detail_url = draw
        .endpoint
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DETAIL_URL);
    let footer = FlexBox::vertical(vec![FlexComponent::Button(FlexButton::link(
        DETAIL_LABEL,
        detail_url,
    ))]);

    let alt_text = format!("{CARD_TITLE} {date} {FIRST_PRIZE_LABEL}: {headline}");
    Message::flex(alt_text, FlexBubble::new(FlexBox::vertical(body), Some(footer)))
}

fn label_value(label: &str, value: &str) -> FlexComponent {
    FlexComponent::Box(FlexBox::baseline(vec![
        FlexComponent::Text(FlexText::new(label).size("sm").color("#8c8c8c").flex(4)),
        FlexComponent::Text(FlexText::new(value).size("sm").flex(5).wrap()),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lotto::{PrizeTier, RunningNumbers};
    use serde_json::Value;

    fn tier(id: &str, numbers: &[&str]) -> PrizeTier {
        PrizeTier {
            id: id.to_string(),
            number: numbers.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn full_draw() -> DrawResult {
        DrawResult {
            date: Some("16 สิงหาคม 2568".to_string()),
            endpoint: Some("https://lotto.example.com/lotto/16082568".to_string()),
            prizes: vec![
                tier("prizeFirst", &["123456"]),
                tier("prizeFirstNear", &["123455", "123457"]),
                tier(
                    "prizeSecond",
                    &["111111", "222222", "333333", "444444", "555555", "666666"],
                ),
            ],
            running_numbers: vec![
                RunningNumbers {
                    id: "runningNumberFrontThree".to_string(),
                    number: vec!["123".to_string(), "456".to_string()],
                },
                RunningNumbers {
                    id: "runningNumberBackThree".to_string(),
                    number: vec!["789".to_string()],
                },
                RunningNumbers {
                    id: "runningNumberBackTwo".to_string(),
                    number: vec!["34".to_string()],
                },
            ],
        }
    }

    /// All `text` leaf values in document order.
    fn text_lines(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(s)) = map.get("text") {
                    out.push(s.clone());
                }
                for v in map.values() {
                    text_lines(v, out);
                }
            }
            Value::Array(items) => {
                for v in items {
                    text_lines(v, out);
                }
            }
            _ => {}
        }
    }

    fn card_lines(draw: &DrawResult) -> Vec<String> {
        let value = serde_json::to_value(result_card(draw)).unwrap();
        let mut out = Vec::new();
        text_lines(&value, &mut out);
        out
    }

    #[test]
    fn six_numbers_chunk_into_two_lines_of_five_and_one() {
        let lines = card_lines(&full_draw());

        let first = lines
            .iter()
            .position(|l| l == "111111 222222 333333 444444 555555")
            .expect("first chunk line missing");
        let second = lines
            .iter()
            .position(|l| l == "666666")
            .expect("second chunk line missing");
        assert!(first < second, "chunk lines out of order");
    }

    #[test]
    fn missing_data_renders_placeholders() {
        let lines = card_lines(&DrawResult::default());

        // headline and date fall back to "-"
        assert!(lines.contains(&"งวดวันที่ -".to_string()));
        assert!(lines.contains(&"-".to_string()));
        // all three running lines render, each with a "-" value
        assert_eq!(lines.iter().filter(|l| *l == "-").count(), 4);
        for label in ["เลขหน้า 3 ตัว", "เลขท้าย 3 ตัว", "เลขท้าย 2 ตัว"] {
            assert!(lines.contains(&label.to_string()), "missing {label}");
        }
        // near-miss line is omitted, secondary tiers are omitted
        assert!(!lines.contains(&NEAR_PRIZE_LABEL.to_string()));
        assert!(!lines.contains(&"รางวัลที่ 2".to_string()));
    }

    #[test]
    fn near_tier_renders_space_joined() {
        let lines = card_lines(&full_draw());
        assert!(lines.contains(&NEAR_PRIZE_LABEL.to_string()));
        assert!(lines.contains(&"123455 123457".to_string()));
    }

    #[test]
    fn running_lines_keep_fixed_order() {
        let lines = card_lines(&full_draw());
        let front = lines.iter().position(|l| l == "เลขหน้า 3 ตัว").unwrap();
        let back3 = lines.iter().position(|l| l == "เลขท้าย 3 ตัว").unwrap();
        let back2 = lines.iter().position(|l| l == "เลขท้าย 2 ตัว").unwrap();
        assert!(front < back3 && back3 < back2);
        assert!(lines.contains(&"123 456".to_string()));
    }

    #[test]
    fn formatting_is_deterministic() {
        let draw = full_draw();
        let a = serde_json::to_value(result_card(&draw)).unwrap();
        let b = serde_json::to_value(result_card(&draw)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn link_action_uses_endpoint_or_default() {
        let with_endpoint = serde_json::to_value(result_card(&full_draw())).unwrap();
        assert_eq!(
            with_endpoint["contents"]["footer"]["contents"][0]["action"]["uri"],
            "https://lotto.example.com/lotto/16082568"
        );

        let without = serde_json::to_value(result_card(&DrawResult::default())).unwrap();
        assert_eq!(
            without["contents"]["footer"]["contents"][0]["action"]["uri"],
            DEFAULT_DETAIL_URL
        );
    }

    #[test]
    fn alt_text_summarizes_date_and_headline() {
        let value = serde_json::to_value(result_card(&full_draw())).unwrap();
        let alt = value["altText"].as_str().unwrap();
        assert!(alt.contains("16 สิงหาคม 2568"));
        assert!(alt.contains("123456"));
    }
}
