// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Demo runtime: a Rapier scene with one dispenser and two characters.
//!
//! Usage: `volley-runtime [CONFIG.json] [SECONDS]`, or
//! `volley-runtime --print-config` to dump the default configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use env_logger::{Builder, Env};
use tokio::time::{interval, sleep};
use volley_agents::DispenserAgent;
use volley_core::event::TriggerEvent;
use volley_core::math::Vec3;
use volley_core::physics::{BodyType, HostServices, ObjectId};
use volley_core::DispenserConfig;
use volley_infra::{BodyTemplate, CreationThrottle, RapierHost, RapierScene, TemplateShape};

const STEP: Duration = Duration::from_millis(16);
const TRIGGER_PERIOD: Duration = Duration::from_millis(1500);
const REPORT_PERIOD: Duration = Duration::from_secs(5);
const DEFAULT_RUN_SECS: u64 = 20;

fn default_config() -> DispenserConfig {
    DispenserConfig {
        template: Some("Ball".into()),
        ..DispenserConfig::default()
    }
}

fn build_scene(template: &str) -> (RapierHost, ObjectId) {
    let mut scene = RapierScene::new();
    scene.register_template(template, BodyTemplate::projectile(0.25));

    scene.add_object(
        &BodyTemplate::scenery(Vec3::new(50.0, 0.5, 50.0)),
        Vec3::new(0.0, -0.5, 0.0),
    );
    let dispenser = scene.add_object(
        &BodyTemplate {
            shape: TemplateShape::Cuboid {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            body_type: Some(BodyType::Static),
            character: false,
        },
        Vec3::new(0.0, 0.5, 0.0),
    );
    scene.add_object(&BodyTemplate::character(), Vec3::new(0.0, 0.9, -12.0));
    scene.add_object(&BodyTemplate::character(), Vec3::new(3.0, 0.9, -18.0));

    let host = RapierHost::new(scene).with_throttle(CreationThrottle::new(5, 2.0));
    (host, dispenser)
}

#[tokio::main]
async fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("rapier3d", log::LevelFilter::Warn)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next().as_deref() {
        Some("--print-config") => {
            println!("{}", serde_json::to_string_pretty(&default_config())?);
            return Ok(());
        }
        Some(path) => DispenserConfig::from_file(path)
            .with_context(|| format!("failed to load dispenser config from '{path}'"))?,
        None => default_config(),
    };
    let run_for = match args.next() {
        Some(secs) => Duration::from_secs(
            secs.parse()
                .with_context(|| format!("invalid run duration '{secs}'"))?,
        ),
        None => Duration::from_secs(DEFAULT_RUN_SECS),
    };

    let Some(template) = config.template.clone() else {
        bail!("the configuration names no template to dispense");
    };
    let (host, dispenser_object) = build_scene(&template);
    let host = Arc::new(host);

    // The dispenser block doubles as the auto-fire shooter when enabled.
    let agent = DispenserAgent::new(config, HostServices::from_host(Arc::clone(&host)))
        .with_shooter(dispenser_object);
    if let Some(reason) = agent.disabled_reason() {
        bail!("dispenser disabled: {reason}");
    }
    let (dispenser, join) = agent.spawn();
    log::info!("Running the dispenser demo for {run_for:?}.");

    let mut step = interval(STEP);
    let mut trigger = interval(TRIGGER_PERIOD);
    let mut report = interval(REPORT_PERIOD);
    let deadline = sleep(run_for);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = step.tick() => host.step(STEP.as_secs_f32()),
            _ = trigger.tick() => {
                dispenser.trigger(TriggerEvent::new(dispenser_object, Vec3::Z));
            }
            _ = report.tick() => {
                let stats = dispenser.stats();
                log::info!(
                    "live {} | spawned {} | auto shots {} | evicted {} | throttled {} | bodies {}",
                    stats.live,
                    stats.spawned,
                    stats.auto_shots,
                    stats.evicted,
                    stats.throttled,
                    host.scene().body_count()
                );
            }
            _ = &mut deadline => break,
        }
    }

    dispenser.shutdown();
    join.await.context("dispenser task failed")?;
    log::info!("Final stats: {:?}", dispenser.stats());
    Ok(())
}
