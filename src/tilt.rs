//! Tilt input
//!
//! A rotation-rate sensor pushes samples whenever it likes; the frame loop
//! reads the latest tilt once per frame. The two meet in a [`TiltCell`], a
//! single atomic word holding both components, so a sample is never seen
//! half-written.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

/// Errors raised while acquiring a tilt sensor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("No rotation-rate sensor available")]
    Unavailable,
    #[error("Failed to register sensor listener: {0}")]
    Listener(String),
}

/// Map a 3-axis rotation-rate sample to a tilt vector.
///
/// Axis 1 drives horizontal tilt (negated), axis 0 vertical tilt. Axis 2 is
/// ignored and any missing axis reads as zero.
pub fn tilt_from_rotation_rate(sample: &[f32]) -> Vec2 {
    let axis = |i: usize| sample.get(i).copied().unwrap_or(0.0);
    Vec2::new(-axis(1), axis(0))
}

/// Order a browser `rotationRate` reading (degrees per second, any field may be
/// null) as a `[x, y, z]` sample in radians per second: beta, gamma, alpha.
pub fn rotation_rate_sample(alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) -> [f32; 3] {
    let axis = |deg: Option<f64>| deg.map(|d| d.to_radians() as f32).unwrap_or(0.0);
    [axis(beta), axis(gamma), axis(alpha)]
}

/// Held arrow keys, in the order left, up, right, down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys([bool; 4]);

impl HeldKeys {
    fn index(key: &str) -> Option<usize> {
        match key {
            "ArrowLeft" => Some(0),
            "ArrowUp" => Some(1),
            "ArrowRight" => Some(2),
            "ArrowDown" => Some(3),
            _ => None,
        }
    }

    /// Whether `key` is one of the arrow keys
    pub fn handles(key: &str) -> bool {
        Self::index(key).is_some()
    }

    /// Record a press or release. Returns true when the held set changed.
    pub fn set(&mut self, key: &str, pressed: bool) -> bool {
        match Self::index(key) {
            Some(i) if self.0[i] != pressed => {
                self.0[i] = pressed;
                true
            }
            _ => false,
        }
    }

    /// Unit tilt per axis; opposite keys cancel
    pub fn tilt(self) -> Vec2 {
        let [left, up, right, down] = self.0.map(|held| if held { 1.0 } else { 0.0 });
        Vec2::new(right - left, down - up)
    }
}

/// Latest tilt, shared between the sensor callback and the frame loop
#[derive(Debug, Clone, Default)]
pub struct TiltCell(Arc<AtomicU64>);

impl TiltCell {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn store(&self, tilt: Vec2) {
        let bits = ((tilt.x.to_bits() as u64) << 32) | tilt.y.to_bits() as u64;
        self.0.store(bits, Ordering::Release);
    }

    #[inline]
    pub fn load(&self) -> Vec2 {
        let bits = self.0.load(Ordering::Acquire);
        Vec2::new(
            f32::from_bits((bits >> 32) as u32),
            f32::from_bits(bits as u32),
        )
    }

    /// Feed a raw rotation-rate sample
    pub fn store_sample(&self, sample: &[f32]) {
        self.store(tilt_from_rotation_rate(sample));
    }

    pub fn clear(&self) {
        self.store(Vec2::ZERO);
    }
}

/// A platform source of rotation-rate samples
pub trait TiltSensor {
    /// Begin delivering samples into `sink`
    fn start(&mut self, sink: TiltCell) -> Result<(), SensorError>;
    /// Stop delivering samples. Must be safe to call when not started.
    fn stop(&mut self);
}

/// Scoped sensor registration: started on creation, stopped on drop
pub struct SensorSubscription<S: TiltSensor> {
    sensor: S,
    active: bool,
}

impl<S: TiltSensor> SensorSubscription<S> {
    /// Start `sensor` feeding `sink`.
    ///
    /// A missing sensor is not fatal: the subscription is still returned and
    /// tilt simply stays at zero.
    pub fn start(mut sensor: S, sink: TiltCell) -> Self {
        let active = match sensor.start(sink) {
            Ok(()) => {
                log::info!("Tilt sensor started");
                true
            }
            Err(e) => {
                log::warn!("{e}; tilt will stay at zero");
                false
            }
        };
        Self { sensor, active }
    }

    /// Whether samples are being delivered
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl<S: TiltSensor> Drop for SensorSubscription<S> {
    fn drop(&mut self) {
        self.sensor.stop();
        if self.active {
            log::info!("Tilt sensor stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        starts: Cell<u32>,
        stops: Cell<u32>,
    }

    struct FakeGyro {
        present: bool,
        counters: Rc<Counters>,
        sample: [f32; 3],
    }

    impl TiltSensor for FakeGyro {
        fn start(&mut self, sink: TiltCell) -> Result<(), SensorError> {
            if !self.present {
                return Err(SensorError::Unavailable);
            }
            self.counters.starts.set(self.counters.starts.get() + 1);
            sink.store_sample(&self.sample);
            Ok(())
        }

        fn stop(&mut self) {
            self.counters.stops.set(self.counters.stops.get() + 1);
        }
    }

    #[test]
    fn test_axis_mapping() {
        assert_eq!(tilt_from_rotation_rate(&[0.5, 2.0, 9.0]), Vec2::new(-2.0, 0.5));
        assert_eq!(tilt_from_rotation_rate(&[0.5]), Vec2::new(0.0, 0.5));
        assert_eq!(tilt_from_rotation_rate(&[]), Vec2::ZERO);
    }

    #[test]
    fn test_rotation_rate_units_and_order() {
        let [x, y, z] = rotation_rate_sample(Some(90.0), Some(180.0), Some(-45.0));
        assert!((x - std::f32::consts::PI).abs() < 1e-6);
        assert!((y + std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((z - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        // beta drives vertical tilt, gamma horizontal (negated)
        let tilt = tilt_from_rotation_rate(&rotation_rate_sample(Some(90.0), Some(180.0), Some(-45.0)));
        assert!((tilt.x - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((tilt.y - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_rate_null_fields() {
        assert_eq!(rotation_rate_sample(None, None, None), [0.0; 3]);
        let [x, y, z] = rotation_rate_sample(None, None, Some(57.29578));
        assert_eq!(x, 0.0);
        assert!((y - 1.0).abs() < 1e-5);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_held_keys_tilt() {
        let mut keys = HeldKeys::default();
        assert_eq!(keys.tilt(), Vec2::ZERO);

        assert!(keys.set("ArrowRight", true));
        assert_eq!(keys.tilt(), Vec2::new(1.0, 0.0));
        assert!(keys.set("ArrowUp", true));
        assert_eq!(keys.tilt(), Vec2::new(1.0, -1.0));

        // Key repeat changes nothing
        assert!(!keys.set("ArrowRight", true));

        // Opposite keys cancel
        assert!(keys.set("ArrowLeft", true));
        assert_eq!(keys.tilt(), Vec2::new(0.0, -1.0));
        assert!(keys.set("ArrowDown", true));
        assert_eq!(keys.tilt(), Vec2::ZERO);

        assert!(keys.set("ArrowLeft", false));
        assert_eq!(keys.tilt(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_held_keys_ignores_other_keys() {
        let mut keys = HeldKeys::default();
        assert!(!HeldKeys::handles("a"));
        assert!(HeldKeys::handles("ArrowDown"));
        assert!(!keys.set("Space", true));
        assert_eq!(keys, HeldKeys::default());
    }

    #[test]
    fn test_cell_round_trips_exact_bits() {
        let cell = TiltCell::new();
        assert_eq!(cell.load(), Vec2::ZERO);

        cell.store(Vec2::new(-0.25, 1.5e-7));
        assert_eq!(cell.load(), Vec2::new(-0.25, 1.5e-7));

        // Clones share the same slot
        let writer = cell.clone();
        writer.store(Vec2::new(3.0, -4.0));
        assert_eq!(cell.load(), Vec2::new(3.0, -4.0));

        writer.clear();
        assert_eq!(cell.load(), Vec2::ZERO);
    }

    #[test]
    fn test_cell_across_threads() {
        let cell = TiltCell::new();
        let writer = cell.clone();
        std::thread::spawn(move || {
            for i in 0..1000 {
                let v = i as f32;
                writer.store(Vec2::new(v, -v));
            }
        })
        .join()
        .unwrap();
        let tilt = cell.load();
        assert_eq!(tilt.x, -tilt.y);
        assert_eq!(tilt.x, 999.0);
    }

    #[test]
    fn test_subscription_stops_on_drop() {
        let counters = Rc::new(Counters::default());
        let cell = TiltCell::new();
        {
            let sub = SensorSubscription::start(
                FakeGyro {
                    present: true,
                    counters: counters.clone(),
                    sample: [1.0, 2.0, 0.0],
                },
                cell.clone(),
            );
            assert!(sub.is_active());
            assert_eq!(cell.load(), Vec2::new(-2.0, 1.0));
            assert_eq!(counters.stops.get(), 0);
        }
        assert_eq!(counters.starts.get(), 1);
        assert_eq!(counters.stops.get(), 1);
    }

    #[test]
    fn test_missing_sensor_leaves_tilt_zero() {
        let counters = Rc::new(Counters::default());
        let cell = TiltCell::new();
        let sub = SensorSubscription::start(
            FakeGyro {
                present: false,
                counters: counters.clone(),
                sample: [1.0, 2.0, 0.0],
            },
            cell.clone(),
        );
        assert!(!sub.is_active());
        assert_eq!(cell.load(), Vec2::ZERO);
        drop(sub);
        // Release is unconditional
        assert_eq!(counters.stops.get(), 1);
    }
}
