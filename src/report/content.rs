//! Newsletter prose
//!
//! Edit the text here to change what every issue says. Placeholders in
//! braces (`{week}`, `{rewards}`, ...) are filled in by the renderer.

pub const OVERVIEW: &str = "
Welcome to **The Blue Pill** - *Week {week}, {year}*. A weekly update covering what's been happening across the Yearn ecosystem.

This newsletter is meant to be a simple summary of recent activity: governance discussions, vault performance, a few protocol-level metrics, and once in a while some alpha we can share. We hope you'll find it useful!

Time seems to be moving faster than ever, but work at Yearn continues steadily. Our agenda for today:
- **Yearn at a glance** - high-level protocol metrics, including TVL and week-over-week changes
- **Vaults** - top yields across chains
- **yCRV** - this week's fees and week-over-week changes
- **yYB** - this week's fees and week-over-week changes
- **Alpha Corner** - features and strategies in development
";

/// Optional text above the vault lists; blank means none
pub const VAULTS_INTRO: &str = "
";

pub const REWARDS_COMPARATIVE: &str = "
This week {label} stakers received **{rewards} crvUSD** rewards, compared to **{prev_rewards} crvUSD** in the prior week, for a week-over-week change of **{wow}%**
";

pub const REWARDS_CURRENT: &str = "
This week {label} stakers received **{rewards} crvUSD** rewards.
";

pub const COMING_SOON: &str = "Coming soon!";

pub const ALPHA: &str = "
No Alpha today. Come back next week!
";

pub const DISCLAIMER: &str = "
All data presented in this newsletter is based on publicly available sources and onchain information at the time of generation. The scripts used to collect and generate this data are open source and available [here](https://github.com/johnnyonline/yearn-news).
";

pub const SIGN_OFF: &str = "
---

**Until next time, peace!**
";

/// Substitute `{key}` placeholders
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill() {
        let text = fill(OVERVIEW, &[("week", "7".to_string()), ("year", "2026".to_string())]);
        assert!(text.contains("*Week 7, 2026*"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        assert_eq!(fill("{a} {b}", &[("a", "1".to_string())]), "1 {b}");
    }
}
