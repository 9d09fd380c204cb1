//! The Blue Pill Markdown report
//!
//! Rendering is pure: every number comes in through [`NewsletterData`].

pub mod content;
pub mod format;
pub mod render;

use crate::history::WeekStamp;
use crate::rewards::RewardSnapshot;
use crate::tvl::TvlSnapshot;
use crate::vaults::TopVaults;

/// Everything one issue needs
#[derive(Debug, Clone, PartialEq)]
pub struct NewsletterData {
    pub stamp: WeekStamp,
    pub tvl: TvlSnapshot,
    pub vaults: TopVaults,
    /// `None` renders "Coming soon!"
    pub ycrv: Option<RewardSnapshot>,
    pub yyb: Option<RewardSnapshot>,
}

/// Full document, sections separated by a blank line
pub fn render_newsletter(data: &NewsletterData) -> String {
    let sections = [
        render::render_overview(data.stamp),
        render::render_glance(&data.tvl),
        render::render_vaults(&data.vaults),
        render::render_rewards("yCRV", data.ycrv.as_ref()),
        render::render_rewards("yYB", data.yyb.as_ref()),
        render::render_alpha(),
        render::render_disclaimer(),
        render::render_sign_off(),
    ];
    sections.join("\n\n")
}
