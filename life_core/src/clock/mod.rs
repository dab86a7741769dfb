//! Clock - the virtual calendar.
//!
//! Real frame time is scaled into in-game hours. Every whole hour crossed is
//! announced with [`ClockEvent::HourElapsed`] (the store fades its memories and
//! the echo map weakens its echoes in response), midnight rolls the day, and
//! the season follows from the day counter. While the session is in a
//! terminal phase the clock neither advances nor publishes anything.

use life_rules::{ClockConfig, Season, SessionPhase, WorldTime};
use tracing::{debug, info};

use crate::events::{ClockEvent, EventSink};

const SECONDS_PER_HOUR: f64 = 3600.0;
const HOURS_PER_DAY: u32 = 24;
/// Hour boundaries announced by a single [`Clock::advance`]. Anything beyond
/// stays pending and is announced by the following calls.
const MAX_HOURS_PER_ADVANCE: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct Clock {
    config: ClockConfig,
    /// Last whole hour announced, in `[0, 24)`.
    hour_of_day: u32,
    /// In-game hours elapsed since `hour_of_day` began. Below 1 unless a
    /// catch-up is still pending.
    pending: f64,
    day: u32,
    season: Season,
}

impl Clock {
    pub fn new(config: ClockConfig) -> Self {
        let day = config.start_day.max(1);
        let start = f64::from(config.start_hour).rem_euclid(f64::from(HOURS_PER_DAY));
        let hour_of_day = (start.floor() as u32).min(HOURS_PER_DAY - 1);
        Self {
            hour_of_day,
            pending: (start - f64::from(hour_of_day)).max(0.0),
            season: Season::for_day(day, config.days_per_season),
            day,
            config,
        }
    }

    /// Advance by `real_seconds` of frame time.
    ///
    /// Publishes, for every hour boundary crossed and in order: `HourElapsed`,
    /// then `DayElapsed` and `SeasonChanged` when they apply. Finishes with a
    /// single `TimeOfDayUpdated`.
    pub fn advance(&mut self, real_seconds: f32, phase: SessionPhase, sink: &mut dyn EventSink) {
        if phase.is_terminal() || !real_seconds.is_finite() || real_seconds < 0.0 {
            return;
        }

        self.pending +=
            f64::from(real_seconds) * f64::from(self.config.time_scale) / SECONDS_PER_HOUR;
        let crossed = (self.pending.floor() as u64).min(MAX_HOURS_PER_ADVANCE);

        for _ in 0..crossed {
            self.pending -= 1.0;
            self.hour_of_day = (self.hour_of_day + 1) % HOURS_PER_DAY;
            sink.emit(ClockEvent::HourElapsed(self.hour_of_day).into());
            if self.hour_of_day == 0 {
                self.roll_day(sink);
            }
        }

        if self.pending >= 1.0 {
            debug!(backlog = self.pending.floor(), "hours left for the next advance");
        }
        sink.emit(ClockEvent::TimeOfDayUpdated(self.time_of_day()).into());
    }

    fn roll_day(&mut self, sink: &mut dyn EventSink) {
        self.day += 1;
        debug!(day = self.day, "day elapsed");
        sink.emit(ClockEvent::DayElapsed(self.day).into());

        let season = Season::for_day(self.day, self.config.days_per_season);
        if season != self.season {
            info!(?season, day = self.day, "season changed");
            self.season = season;
            sink.emit(ClockEvent::SeasonChanged(season).into());
        }
    }

    /// Continuous hour of day in `[0, 24)`, never past the next unannounced
    /// boundary.
    pub fn hour(&self) -> f32 {
        let hour = (f64::from(self.hour_of_day) + self.pending.clamp(0.0, 1.0)) as f32;
        let next = (self.hour_of_day + 1) as f32;
        if hour < next {
            hour
        } else {
            // Largest f32 below the boundary.
            f32::from_bits(next.to_bits() - 1)
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Current virtual time.
    pub fn now(&self) -> WorldTime {
        WorldTime::new(self.day, self.hour(), self.season)
    }

    /// Time of day normalised to `[0, 1)`.
    pub fn time_of_day(&self) -> f32 {
        self.hour() / HOURS_PER_DAY as f32
    }

    pub fn is_night(&self) -> bool {
        self.now().is_night()
    }

    pub fn is_golden_hour(&self) -> bool {
        self.now().is_golden_hour()
    }

    /// "Day N, HH:MM".
    pub fn formatted(&self) -> String {
        self.now().formatted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LifeEvent;

    fn clock_at(day: u32, hour: f32) -> Clock {
        Clock::new(ClockConfig {
            time_scale: 3600.0,
            start_day: day,
            start_hour: hour,
            days_per_season: 2,
        })
    }

    fn clock_events(events: &[LifeEvent]) -> Vec<ClockEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                LifeEvent::Clock(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_step_within_hour_only_updates_time_of_day() {
        let mut clock = clock_at(1, 10.0);
        let mut events = Vec::new();

        clock.advance(0.5, SessionPhase::Exploring, &mut events);

        assert!((clock.hour() - 10.5).abs() < 0.001);
        assert_eq!(
            clock_events(&events),
            vec![ClockEvent::TimeOfDayUpdated(10.5 / 24.0)]
        );
    }

    #[test]
    fn test_hour_boundary() {
        let mut clock = clock_at(1, 10.5);
        let mut events = Vec::new();

        clock.advance(0.75, SessionPhase::Exploring, &mut events);

        let events = clock_events(&events);
        assert_eq!(events[0], ClockEvent::HourElapsed(11));
        assert_eq!(events.len(), 2);
        assert!((clock.hour() - 11.25).abs() < 0.001);
    }

    #[test]
    fn test_every_crossed_hour_is_announced() {
        let mut clock = clock_at(1, 9.5);
        let mut events = Vec::new();

        clock.advance(3.0, SessionPhase::Exploring, &mut events);

        let hours: Vec<_> = clock_events(&events)
            .into_iter()
            .filter_map(|e| match e {
                ClockEvent::HourElapsed(h) => Some(h),
                _ => None,
            })
            .collect();
        assert_eq!(hours, vec![10, 11, 12]);
    }

    #[test]
    fn test_midnight_rolls_day_and_season() {
        let mut clock = clock_at(2, 23.5);
        assert_eq!(clock.season(), Season::Spring);
        let mut events = Vec::new();

        clock.advance(1.0, SessionPhase::Exploring, &mut events);

        assert_eq!(clock.day(), 3);
        assert_eq!(clock.season(), Season::Summer);
        assert!((clock.hour() - 0.5).abs() < 0.001);
        assert_eq!(
            clock_events(&events),
            vec![
                ClockEvent::HourElapsed(0),
                ClockEvent::DayElapsed(3),
                ClockEvent::SeasonChanged(Season::Summer),
                ClockEvent::TimeOfDayUpdated(0.5 / 24.0),
            ]
        );
    }

    #[test]
    fn test_day_without_season_change() {
        let mut clock = clock_at(1, 23.5);
        let mut events = Vec::new();

        clock.advance(1.0, SessionPhase::Exploring, &mut events);

        assert_eq!(clock.day(), 2);
        assert!(!clock_events(&events)
            .iter()
            .any(|e| matches!(e, ClockEvent::SeasonChanged(_))));
    }

    #[test]
    fn test_terminal_phase_freezes_clock() {
        let mut clock = clock_at(1, 10.0);
        let mut events = Vec::new();

        clock.advance(5.0, SessionPhase::Ending, &mut events);
        clock.advance(5.0, SessionPhase::Ended, &mut events);

        assert!(events.is_empty());
        assert_eq!(clock.hour(), 10.0);
    }

    #[test]
    fn test_default_scale_is_a_minute_per_second() {
        let mut clock = Clock::new(ClockConfig::default());
        let mut events = Vec::new();

        clock.advance(30.0, SessionPhase::Exploring, &mut events);

        assert!((clock.hour() - 8.5).abs() < 0.001);
        assert_eq!(clock.formatted(), "Day 1, 08:30");
    }

    #[test]
    fn test_hour_just_short_of_midnight_stays_on_the_same_day() {
        let mut clock = clock_at(1, 23.5);
        let mut events = Vec::new();

        clock.advance(0.4999996, SessionPhase::Exploring, &mut events);

        assert_eq!(clock_events(&events).len(), 1);
        assert_eq!(clock.day(), 1);
        assert!(clock.hour() < 24.0);
        assert_eq!(clock.formatted(), "Day 1, 23:59");

        events.clear();
        clock.advance(0.5, SessionPhase::Exploring, &mut events);

        let events = clock_events(&events);
        assert_eq!(events[0], ClockEvent::HourElapsed(0));
        assert_eq!(events[1], ClockEvent::DayElapsed(2));
        assert_eq!(clock.day(), 2);
        assert!((clock.hour() - 0.5).abs() < 0.001);
    }

    #[derive(Default)]
    struct Tally {
        hours: u64,
        days: u64,
    }

    impl EventSink for Tally {
        fn emit(&mut self, event: LifeEvent) {
            match event {
                LifeEvent::Clock(ClockEvent::HourElapsed(_)) => self.hours += 1,
                LifeEvent::Clock(ClockEvent::DayElapsed(_)) => self.days += 1,
                _ => {}
            }
        }
    }

    #[test]
    fn test_small_steps_keep_announcements_in_line_with_the_calendar() {
        let mut clock = clock_at(1, 8.0);
        let mut tally = Tally::default();

        for _ in 0..288_000 {
            clock.advance(1.0 / 144.0, SessionPhase::Exploring, &mut tally);
        }

        let elapsed = clock.now().total_hours().floor() as u64 - 8;
        assert_eq!(tally.hours, elapsed);
        assert_eq!(tally.days, u64::from(clock.day() - 1));
        assert!(tally.hours.abs_diff(2000) <= 1);
    }

    #[test]
    fn test_long_catch_up_is_spread_over_later_advances() {
        let mut clock = clock_at(1, 0.0);
        let mut tally = Tally::default();

        clock.advance(5000.0, SessionPhase::Exploring, &mut tally);
        assert_eq!(tally.hours, MAX_HOURS_PER_ADVANCE);

        for _ in 0..4 {
            clock.advance(0.0, SessionPhase::Exploring, &mut tally);
        }
        assert_eq!(tally.hours, 5000);
        assert_eq!(clock.day(), 209);
        assert_eq!(tally.days, 208);
        assert!((clock.hour() - 8.0).abs() < 0.001);

        clock.advance(0.0, SessionPhase::Exploring, &mut tally);
        assert_eq!(tally.hours, 5000);
    }

    #[test]
    fn test_helpers() {
        assert!(clock_at(1, 22.0).is_night());
        assert!(!clock_at(1, 12.0).is_night());
        assert!(clock_at(1, 17.5).is_golden_hour());
        assert!((clock_at(1, 12.0).time_of_day() - 0.5).abs() < 0.001);
    }
}
