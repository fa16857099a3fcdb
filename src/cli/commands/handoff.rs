use anyhow::Result;

use crate::coordinator::PodCoordinator;
use crate::progression::HandoffOutcome;
use crate::tasks::Actor;

pub async fn submit(
    coordinator: &PodCoordinator,
    project_id: &str,
    member_id: &str,
    link: &str,
    actor: Option<Actor>,
) -> Result<()> {
    let mut receipt = coordinator
        .submit_handoff_as(actor.as_ref(), project_id, member_id, link)
        .await?;

    match &receipt.outcome {
        HandoffOutcome::Advanced {
            completed_member,
            next_member,
            ..
        } => {
            println!("✅ {} handed off", completed_member.name);
            println!("➡️  Next in line: {} ({})", next_member.name, next_member.role);
        }
        HandoffOutcome::Finished { completed_member } => {
            println!("✅ {} handed off", completed_member.name);
            println!("🎉 All stages completed for {}", receipt.project.name);
        }
        HandoffOutcome::LinkUpdated { member } => {
            println!("🔗 Updated hand-off link for {}", member.name);
        }
    }

    // The process exits right after this; let the notification finish first.
    if receipt.notification_delivered().await == Some(false) {
        println!("⚠️  Hand-off saved, but the notification could not be delivered");
    }
    Ok(())
}
