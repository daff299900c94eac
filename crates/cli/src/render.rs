//! Plain-text rendering for the terminal.

use banana_core::account::{GalleryItem, Plan, User};
use banana_core::Slot;

/// One line describing slot `index` (shown 1-based).
pub fn render_slot(index: usize, slot: &Slot, placeholder: &str) -> String {
    let n = index + 1;
    match slot {
        Slot::Idle => format!("[{n}] {placeholder}"),
        Slot::Loading { job_id: None } => format!("[{n}] starting"),
        Slot::Loading { job_id: Some(job_id) } => format!("[{n}] working (job {job_id})"),
        Slot::Completed { image_url, .. } => format!("[{n}] done: {image_url}"),
        Slot::Failed { error, .. } => format!("[{n}] failed: {error}"),
    }
}

pub fn render_user(user: &User) -> String {
    format!(
        "{} <{}>\ncredits: {}",
        user.profile.display_name, user.email, user.credits.balance
    )
}

pub fn render_gallery_item(item: &GalleryItem) -> String {
    format!("{}  {}  {}", item.id, item.title, item.asset.url)
}

pub fn render_plan(plan: &Plan) -> String {
    let mut tags = Vec::new();
    if plan.current {
        tags.push("current");
    }
    if plan.popular {
        tags.push("popular");
    }

    let mut out = format!("{} (${:.2}/mo)", plan.name, plan.price);
    if !tags.is_empty() {
        out.push_str(&format!(" [{}]", tags.join(", ")));
    }
    out.push_str(&format!("\n  {}", plan.description));
    for feature in &plan.features {
        let mark = if feature.included { '+' } else { '-' };
        out.push_str(&format!("\n  {mark} {}", feature.text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use banana_core::account::PlanFeature;

    #[test]
    fn slots_render_per_status() {
        let placeholder = "Your creation will appear here";
        assert_eq!(render_slot(0, &Slot::Idle, placeholder), "[1] Your creation will appear here");
        assert_eq!(render_slot(1, &Slot::loading(), placeholder), "[2] starting");
        assert_eq!(
            render_slot(
                2,
                &Slot::Failed {
                    job_id: None,
                    error: "rate limited".into()
                },
                placeholder
            ),
            "[3] failed: rate limited"
        );
        assert_eq!(
            render_slot(
                3,
                &Slot::Completed {
                    job_id: "j4".into(),
                    image_url: "https://cdn/a.png".into()
                },
                placeholder
            ),
            "[4] done: https://cdn/a.png"
        );
    }

    #[test]
    fn plan_lists_tags_and_features() {
        let plan = Plan {
            id: "pro".into(),
            name: "Pro".into(),
            description: "For creators".into(),
            price: 19.0,
            current: false,
            popular: true,
            features: vec![
                PlanFeature {
                    text: "1000 credits".into(),
                    included: true,
                },
                PlanFeature {
                    text: "Team seats".into(),
                    included: false,
                },
            ],
        };

        assert_eq!(
            render_plan(&plan),
            "Pro ($19.00/mo) [popular]\n  For creators\n  + 1000 credits\n  - Team seats"
        );
    }
}
