//! # Link Annotator
//!
//! Turns a [`StageResult`] into the attribute set the client reads.

use linktip_shared::{ElementId, LinkAnnotation, LinkTitles, TooltipFlags};

use crate::pipeline::StageResult;

/// Encodes early-phase results for the client.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkAnnotator;

impl LinkAnnotator {
    /// Builds the annotation. The element id comes from the post-redirect
    /// target, so every link to the same page shares one tooltip.
    #[must_use]
    pub fn annotate(result: &StageResult) -> LinkAnnotation {
        let direct = (!result.direct_target.same_page(&result.target))
            .then(|| result.direct_target.full_text());
        LinkAnnotation {
            element_id: ElementId::from_title(&result.target),
            flags: TooltipFlags {
                can_late_follow: result.can_late_follow,
                is_image: result.is_image,
                empty_title: result.empty_title,
                missing_page: result.missing_page,
            },
            titles: LinkTitles {
                target: result.target.full_text(),
                direct,
                tooltip: result.tooltip_title.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linktip_shared::PageTitle;

    fn result(direct: &str, target: &str) -> StageResult {
        StageResult {
            can_late_follow: false,
            direct_target: PageTitle::parse(direct).unwrap(),
            target: PageTitle::parse(target).unwrap(),
            tooltip_title: Some("Tooltip:Foo".into()),
            is_image: false,
            missing_page: true,
            empty_title: false,
        }
    }

    #[test]
    fn test_annotation_without_redirect() {
        let annotation = LinkAnnotator::annotate(&result("Foo bar#S", "Foo bar#S"));
        assert_eq!(annotation.element_id.as_str(), "Foo_20-bar");
        assert_eq!(annotation.flags.encode(), "fieM");
        assert_eq!(annotation.titles.encode(), "Foo bar#S||Tooltip:Foo");
    }

    #[test]
    fn test_annotation_with_redirect() {
        let annotation = LinkAnnotator::annotate(&result("Old#S", "Foo#S"));
        assert_eq!(annotation.element_id.as_str(), "Foo");
        assert_eq!(annotation.titles.direct.as_deref(), Some("Old#S"));
    }
}
