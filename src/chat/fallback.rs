//! Canned replies used when no API key is configured in development
//! mode, so the chat loop can be exercised without a backend.
use rand::Rng;
use rand::prelude::IndexedRandom;

pub const GOAL_REPLY: &str = "让我帮你分析一下目标和计划。\n\n1. 首先，你的目标是什么？请具体描述一下。\n2. 这个目标对你来说有多重要？\n3. 你期望在什么时间范围内实现它？\n4. 目前遇到了哪些困难？\n\n让我们一步步来规划实现的方案。";

pub const PROBLEM_REPLY: &str = "我明白你遇到了困难。让我们一起来分析这个问题：\n\n1. 这个问题具体表现在哪些方面？\n2. 它对你的影响有多大？\n3. 你已经尝试过哪些解决方法？\n4. 现在最急需解决的是什么？\n\n基于你的回答，我们可以制定一个切实可行的解决方案。";

pub const ADVICE_REPLY: &str = "关于这个情况，我有以下建议：\n\n1. 首先，让我们客观分析现状\n2. 考虑可能的解决方案：\n   - 方案A：...\n   - 方案B：...\n   - 方案C：...\n3. 评估每个方案的优劣势\n4. 制定具体的执行计划\n\n你觉得这些建议中，哪些最适合你的情况？";

pub const THANKS_REPLY: &str = "不用谢！很高兴能帮到你。如果还有任何问题，随时都可以问我。我会继续为你提供支持和建议。";

pub const POINTS: [&str; 10] = [
    "这可能与个人成长和发展有关",
    "这涉及到时间管理和效率问题",
    "这可能需要考虑长期规划和短期目标",
    "这与建立良好的习惯有关",
    "这需要平衡多个方面的需求",
    "这可能需要一些具体的行动步骤",
    "这涉及到自我认知和理解",
    "这可能需要一些外部资源和支持",
    "这与情绪管理和心理健康有关",
    "这需要考虑可行性和持续性",
];

// Checked in order, first match wins
const TEMPLATES: [(&[&str], &str); 4] = [
    (&["目标", "计划"], GOAL_REPLY),
    (&["问题", "困难"], PROBLEM_REPLY),
    (&["建议", "怎么办"], ADVICE_REPLY),
    (&["谢谢", "感谢"], THANKS_REPLY),
];

/// Builds a reply to `input` without calling any API.
pub fn fallback_reply<R: Rng + ?Sized>(input: &str, rng: &mut R) -> String {
    if let Some((_, reply)) = TEMPLATES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| input.contains(k)))
    {
        return reply.to_string();
    }

    format!(
        "让我仔细思考一下你说的\"{}\"。\n\n这个问题涉及几个方面：\n1. {}\n2. {}\n3. {}\n\n你想先从哪个方面深入讨论？",
        input,
        relevant_point(input, rng),
        relevant_point(input, rng),
        relevant_point(input, rng),
    )
}

/// Picks a discussion point, preferring ones that share a word with
/// the input. Surrounding whitespace never yields an empty word, so a
/// padded input narrows the pool the same way the bare input does.
pub fn relevant_point<R: Rng + ?Sized>(input: &str, rng: &mut R) -> &'static str {
    let words: Vec<&str> = input.split_whitespace().collect();
    let relevant: Vec<&'static str> = POINTS
        .iter()
        .copied()
        .filter(|point| words.iter().any(|w| point.contains(w)))
        .collect();

    let pool: &[&'static str] = if relevant.is_empty() {
        &POINTS
    } else {
        &relevant
    };
    pool.choose(rng).copied().unwrap_or(POINTS[0])
}
