//! Task table and launcher.
//!
//! Every long-running unit of the firmware is a pinned FreeRTOS task.  This
//! module is the single place their priorities, cores and stacks are set.
//!
//! ```text
//!            Core::App                         Core::Pro
//!  ┌──────────────────────────────┐   ┌──────────────────────────┐
//!  │ ranging   (7)  ◀── echo ISR  │   │ notifier (6) ──▶ lwIP    │
//!  │ light     (7)                │   │                          │
//!  │ evaluator (6) ─── Mailbox ───┼──▶│                          │
//!  │ console   (5)                │   │                          │
//!  │ heartbeat (1)                │   │                          │
//!  └──────────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! Sampling outranks evaluation so the evaluator always sees the freshest
//! readings; the console and heartbeat only run when everything else waits.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use embedded_hal::digital::OutputPin;
use log::info;

use crate::app::evaluator::ThresholdEvaluator;
use crate::app::notifier::NotificationClient;
use crate::app::ports::{AnalogPort, Connector, IndicatorPort, LinkPort, TriggerPort};
use crate::config::MonitorConfig;
use crate::console;
use crate::drivers::heartbeat::Heartbeat;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::sensors::ReadingStore;
use crate::sensors::light::LightSampler;
use crate::sensors::ranging::RangingDriver;

/// Placement of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// NUL-terminated for FreeRTOS.
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

pub const RANGING: TaskSpec = TaskSpec {
    name: "ranging\0",
    core: Core::App,
    priority: 7,
    stack_kb: 4,
};

pub const LIGHT: TaskSpec = TaskSpec {
    name: "light\0",
    core: Core::App,
    priority: 7,
    stack_kb: 4,
};

pub const EVALUATOR: TaskSpec = TaskSpec {
    name: "evaluator\0",
    core: Core::App,
    priority: 6,
    stack_kb: 6,
};

/// Runs beside the WiFi/lwIP tasks; needs room for the request buffer.
pub const NOTIFIER: TaskSpec = TaskSpec {
    name: "notifier\0",
    core: Core::Pro,
    priority: 6,
    stack_kb: 8,
};

pub const CONSOLE: TaskSpec = TaskSpec {
    name: "console\0",
    core: Core::App,
    priority: 5,
    stack_kb: 4,
};

pub const HEARTBEAT: TaskSpec = TaskSpec {
    name: "heartbeat\0",
    core: Core::App,
    priority: 1,
    stack_kb: 3,
};

pub const ALL: [TaskSpec; 6] = [RANGING, LIGHT, EVALUATOR, NOTIFIER, CONSOLE, HEARTBEAT];

impl TaskSpec {
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }

    pub fn spawn(&self, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
        spawn_on_core(self.core, self.priority, self.stack_kb, self.name, f)
    }
}

/// Fully wired tasks, ready to start.
pub struct Tasks<T, A, IE, C, L, IN, P, HL> {
    pub ranging: RangingDriver<T>,
    pub light: LightSampler<A>,
    pub evaluator: ThresholdEvaluator<IE>,
    pub notifier: NotificationClient<C, L, IN>,
    pub heartbeat: Heartbeat<P, HL>,
    pub store: Arc<ReadingStore>,
    pub config: MonitorConfig,
}

/// Spawn every task.  Stops at the first spawn failure, leaving the
/// bring-up error LED on.
pub fn launch<T, A, IE, C, L, IN, P, HL>(
    tasks: Tasks<T, A, IE, C, L, IN, P, HL>,
) -> io::Result<Vec<JoinHandle<()>>>
where
    T: TriggerPort + Send + 'static,
    A: AnalogPort + Send + 'static,
    IE: IndicatorPort + Send + 'static,
    C: Connector + Send + 'static,
    L: LinkPort + Send + 'static,
    IN: IndicatorPort + Send + 'static,
    P: OutputPin + Send + 'static,
    HL: LinkPort + Send + 'static,
{
    let Tasks {
        ranging,
        light,
        evaluator,
        notifier,
        heartbeat,
        store,
        config,
    } = tasks;

    let handles = vec![
        RANGING.spawn(move || ranging.run())?,
        LIGHT.spawn(move || light.run())?,
        EVALUATOR.spawn(move || evaluator.run())?,
        CONSOLE.spawn(move || console::run(store, &config))?,
        HEARTBEAT.spawn(move || heartbeat.run())?,
        // Last: it clears the bring-up error LED once running.
        NOTIFIER.spawn(move || notifier.run())?,
    ];
    info!("scheduler: {} tasks running", handles.len());
    Ok(handles)
}
