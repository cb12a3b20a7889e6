use std::sync::Arc;

use futures_util::future::try_join;
use serde::{Deserialize, Serialize};
use waypoint_core::repository::checkpoint::CheckpointStore;
use waypoint_core::workflow::context::ExecutionContext;

use super::DemoOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub id: String,
    pub laptop: String,
    pub email: String,
}

/// Employee onboarding: create the record, provision laptop and access
/// concurrently, then send the welcome email once both are done.
///
/// The provisioning steps are joined on this task and polled in order, so
/// `provision_laptop` always takes sequence 2 and `setup_access` sequence 3.
pub async fn run<S: CheckpointStore + 'static>(
    ctx: Arc<ExecutionContext<S>>,
    options: DemoOptions,
) -> anyhow::Result<()> {
    let pace = options.pace;

    let mut employee = ctx
        .step("create_record", move || async move {
            tokio::time::sleep(pace * 2).await;
            let emp = Employee {
                name: "John Doe".to_string(),
                id: "EMP001".to_string(),
                ..Default::default()
            };
            println!("    📝 [HR] Created employee record: {}", emp.name);
            Ok::<_, anyhow::Error>(emp)
        })
        .await?;

    let employee_id = employee.id.clone();
    let laptop = ctx.step("provision_laptop", move || async move {
        tokio::time::sleep(pace * 4).await;
        let item = "MacBook Pro M2".to_string();
        println!("    💻 [IT] Provisioned hardware: {item}");
        Ok::<_, anyhow::Error>(item)
    });
    let access = ctx.step("setup_access", move || async move {
        tokio::time::sleep(pace * 4).await;
        let addr = format!("{employee_id}@company.com");
        println!("    🔑 [SEC] Generated email: {addr}");
        Ok::<_, anyhow::Error>(addr)
    });

    // Fails fast if either branch fails.
    let (laptop, email) = try_join(laptop, access).await?;
    employee.laptop = laptop;
    employee.email = email;

    ctx.step("send_welcome_email", move || async move {
        tokio::time::sleep(pace * 2).await;
        println!("    📧 [MAIL] Sending welcome pack to {}", employee.email);
        println!("    🎉 Onboarding fully complete for: {}", employee.name);
        Ok::<_, anyhow::Error>(true)
    })
    .await?;

    Ok(())
}
