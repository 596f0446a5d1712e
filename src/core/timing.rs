// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
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

//! Timing Event System
//!
//! This module implements the discrete-event scheduler that drives delayed
//! hardware behaviour such as the geometry engine's command latency.
//!
//! # Architecture
//!
//! The timing system uses a global tick counter to synchronize all emulator components.
//! Events are scheduled to run at specific tick counts. Components never get
//! called back directly: `run_events()` returns the handles that fired and the
//! owner hands that list to each component's `process_events()`.
//!
//! # Example
//!
//! ```
//! use dsrx::core::timing::{Scheduler, TimingEventManager};
//!
//! let mut timing = TimingEventManager::new();
//!
//! // Register an event
//! let event_id = timing.register_event("Test Event");
//!
//! // Schedule it to run after 1000 ticks
//! timing.schedule(event_id, 1000);
//!
//! // Advance time
//! timing.pending_ticks = 1000;
//! assert_eq!(timing.run_events(), vec![event_id]);
//! ```

/// Tick count type (relative time)
pub type TickCount = i32;

/// Global tick counter type (absolute time since reset)
pub type GlobalTicks = u64;

/// Event handle (identifier for registered events)
pub type EventHandle = usize;

/// Scheduler interface used by hardware components
///
/// This is the narrow surface a component needs to arm and cancel its own
/// delayed events. Firing is reported back through `process_events()` on the
/// component, never through a stored closure.
pub trait Scheduler {
    /// Register a named event and return its handle
    fn register_event(&mut self, name: &'static str) -> EventHandle;

    /// Arm `handle` to fire `ticks` from now, replacing any pending deadline
    fn schedule(&mut self, handle: EventHandle, ticks: TickCount);

    /// Cancel a pending event (no-op if it is not armed)
    fn deactivate(&mut self, handle: EventHandle);

    /// Whether `handle` is currently armed
    fn is_active(&self, handle: EventHandle) -> bool;
}

/// Timing event
///
/// Represents a single scheduled event that will execute at a specific time.
/// Events can be one-shot or periodic (with automatic rescheduling).
#[derive(Debug)]
pub struct TimingEvent {
    /// Event ID (handle)
    pub id: EventHandle,

    /// Event name (for debugging)
    pub name: &'static str,

    /// Next execution time (global ticks)
    pub next_run_time: GlobalTicks,

    /// Last execution time (global ticks)
    pub last_run_time: GlobalTicks,

    /// Interval for periodic events (0 = one-shot)
    pub interval: TickCount,

    /// Whether this event is currently active
    pub active: bool,
}

impl TimingEvent {
    /// Create a new timing event
    ///
    /// # Arguments
    ///
    /// * `id` - Event ID (handle)
    /// * `name` - Event name for debugging
    /// * `interval` - Interval for periodic events (0 for one-shot)
    pub fn new(id: EventHandle, name: &'static str, interval: TickCount) -> Self {
        Self {
            id,
            name,
            next_run_time: 0,
            last_run_time: 0,
            interval,
            active: false,
        }
    }
}

/// Timing Event Manager
///
/// Manages the global timing system and schedules events for execution.
///
/// # Design
///
/// - Global tick counter tracks absolute time
/// - Pending ticks accumulate elapsed time between event checks
/// - Downcount holds the ticks until the next armed event
/// - Events are stored by handle, so a handle is also its index
///
/// # Example
///
/// ```
/// use dsrx::core::timing::{Scheduler, TimingEventManager};
///
/// let mut timing = TimingEventManager::new();
/// let event = timing.register_event("MyEvent");
/// timing.schedule(event, 5000);
///
/// timing.pending_ticks = 5000;
/// timing.run_events();
/// assert!(!timing.is_active(event));
/// ```
#[derive(Debug)]
pub struct TimingEventManager {
    /// Global tick counter (absolute time since reset)
    pub global_tick_counter: GlobalTicks,

    /// Tick counter at last event run
    pub event_run_tick_counter: GlobalTicks,

    /// Pending ticks (accumulated since last event run)
    pub pending_ticks: TickCount,

    /// Downcount (ticks until next event)
    pub downcount: TickCount,

    /// Registered events, indexed by handle
    events: Vec<TimingEvent>,
}

impl TimingEventManager {
    /// Create a new timing event manager
    ///
    /// # Example
    ///
    /// ```
    /// use dsrx::core::timing::TimingEventManager;
    ///
    /// let timing = TimingEventManager::new();
    /// assert_eq!(timing.global_tick_counter, 0);
    /// assert_eq!(timing.pending_ticks, 0);
    /// ```
    pub fn new() -> Self {
        Self {
            global_tick_counter: 0,
            event_run_tick_counter: 0,
            pending_ticks: 0,
            downcount: i32::MAX,
            events: Vec::new(),
        }
    }

    /// Register a periodic event with automatic rescheduling
    ///
    /// # Arguments
    ///
    /// * `name` - Event name for debugging
    /// * `interval` - Interval between executions (in ticks)
    pub fn register_periodic_event(
        &mut self,
        name: &'static str,
        interval: TickCount,
    ) -> EventHandle {
        let handle = self.events.len();
        self.events.push(TimingEvent::new(handle, name, interval));
        handle
    }

    /// Name of a registered event
    pub fn event_name(&self, handle: EventHandle) -> Option<&'static str> {
        self.events.get(handle).map(|e| e.name)
    }

    /// Get current time (global_tick_counter + pending_ticks)
    #[inline]
    fn get_current_time(&self) -> GlobalTicks {
        self.global_tick_counter + self.pending_ticks as GlobalTicks
    }

    /// Update downcount to the next event's run time
    ///
    /// If no events are active, sets downcount to maximum.
    pub fn update_downcount(&mut self) {
        let next = self
            .events
            .iter()
            .filter(|e| e.active)
            .map(|e| e.next_run_time)
            .min();

        self.downcount = match next {
            Some(time) => {
                let ticks = time.saturating_sub(self.global_tick_counter);
                ticks.min(i32::MAX as u64) as i32
            }
            None => i32::MAX,
        };
    }

    /// Run pending timing events
    ///
    /// Advances global time by pending_ticks and returns the handles of every
    /// event whose deadline has been reached, earliest first. One-shot events
    /// are deactivated; periodic events are re-armed one interval later.
    ///
    /// # Example
    ///
    /// ```
    /// use dsrx::core::timing::{Scheduler, TimingEventManager};
    ///
    /// let mut timing = TimingEventManager::new();
    /// let event = timing.register_event("Test");
    /// timing.schedule(event, 1000);
    ///
    /// timing.pending_ticks = 1000;
    /// let triggered = timing.run_events();
    /// assert_eq!(triggered, vec![event]);
    /// ```
    pub fn run_events(&mut self) -> Vec<EventHandle> {
        self.global_tick_counter = self.event_run_tick_counter + self.pending_ticks as GlobalTicks;
        self.pending_ticks = 0;

        let now = self.global_tick_counter;
        let mut due: Vec<(GlobalTicks, EventHandle)> = self
            .events
            .iter()
            .filter(|e| e.active && e.next_run_time <= now)
            .map(|e| (e.next_run_time, e.id))
            .collect();
        due.sort_unstable();

        for &(run_time, handle) in &due {
            let event = &mut self.events[handle];

            log::trace!(
                "Timing: Event '{}' executed (late: {} ticks)",
                event.name,
                now - run_time
            );

            if event.interval > 0 {
                event.last_run_time = event.next_run_time;
                event.next_run_time += event.interval as GlobalTicks;
            } else {
                event.active = false;
            }
        }

        self.update_downcount();
        self.event_run_tick_counter = self.global_tick_counter;

        due.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Reset the timing system
    ///
    /// Clears all state and deactivates all events. Handles stay registered.
    pub fn reset(&mut self) {
        self.global_tick_counter = 0;
        self.event_run_tick_counter = 0;
        self.pending_ticks = 0;
        self.downcount = i32::MAX;

        for event in &mut self.events {
            event.active = false;
            event.next_run_time = 0;
            event.last_run_time = 0;
        }
    }
}

impl Scheduler for TimingEventManager {
    fn register_event(&mut self, name: &'static str) -> EventHandle {
        let handle = self.events.len();
        self.events.push(TimingEvent::new(handle, name, 0));
        handle
    }

    fn schedule(&mut self, handle: EventHandle, ticks: TickCount) {
        let current_time = self.get_current_time();

        let Some(event) = self.events.get_mut(handle) else {
            log::warn!("Timing: schedule of unknown event handle {}", handle);
            return;
        };
        event.next_run_time = current_time + ticks.max(0) as GlobalTicks;
        event.last_run_time = current_time;
        event.active = true;

        self.update_downcount();
    }

    fn deactivate(&mut self, handle: EventHandle) {
        if let Some(event) = self.events.get_mut(handle) {
            event.active = false;
        }
        self.update_downcount();
    }

    fn is_active(&self, handle: EventHandle) -> bool {
        self.events.get(handle).is_some_and(|e| e.active)
    }
}

impl Default for TimingEventManager {
    fn default() -> Self {
        Self::new()
    }
}
