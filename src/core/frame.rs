//! Per-frame bookkeeping: FPS meter, visualizer ring animation, reticle.

use crate::core::constants::*;
use crate::core::emitter::EmitterId;
use crate::core::error::SceneError;
use crate::core::pose::Transform;
use crate::core::scene::{BasicMaterial, Drawable, Geometry, Material, NodeId, SceneHost, SceneNode};
use glam::{EulerRot, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FpsTier {
    Good,
    Warning,
    Bad,
}

impl FpsTier {
    pub fn classify(fps: u32) -> Self {
        if fps > FPS_GOOD_ABOVE {
            FpsTier::Good
        } else if fps > FPS_WARNING_ABOVE {
            FpsTier::Warning
        } else {
            FpsTier::Bad
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            FpsTier::Good => "fps-good",
            FpsTier::Warning => "fps-warning",
            FpsTier::Bad => "fps-bad",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FpsReading {
    pub fps: u32,
    pub tier: FpsTier,
}

/// Counts frames and reports once at least `FPS_WINDOW_MS` has elapsed.
#[derive(Clone, Copy, Debug)]
pub struct FpsMeter {
    frames: u32,
    window_start_ms: f64,
}

impl FpsMeter {
    pub fn new(start_ms: f64) -> Self {
        Self {
            frames: 0,
            window_start_ms: start_ms,
        }
    }

    pub fn tick(&mut self, now_ms: f64) -> Option<FpsReading> {
        self.frames += 1;
        let elapsed = now_ms - self.window_start_ms;
        if elapsed < FPS_WINDOW_MS {
            return None;
        }
        let fps = (self.frames as f64 * 1000.0 / elapsed).round() as u32;
        self.frames = 0;
        self.window_start_ms = now_ms;
        Some(FpsReading {
            fps,
            tier: FpsTier::classify(fps),
        })
    }
}

/// Animated state of one visualizer ring at a given time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingPose {
    pub scale: f32,
    pub spin: f32,
    pub opacity: f32,
}

#[inline]
pub fn ring_pose(t_sec: f32, ring: usize, phase: f32) -> RingPose {
    let i = ring as f32;
    RingPose {
        scale: 1.0 + RING_SCALE_SWING * (t_sec * RING_SCALE_RATE + i + phase).sin(),
        spin: t_sec * (i + 1.0) * RING_SPIN_RATE,
        opacity: VISUALIZER_RING_OPACITY
            + RING_OPACITY_SWING * (t_sec * RING_OPACITY_RATE + i + phase).sin(),
    }
}

/// Scene handles of one attached visualizer.
#[derive(Clone, Debug, PartialEq)]
pub struct Visualizer {
    pub emitter: EmitterId,
    pub root: NodeId,
    pub rings: Vec<NodeId>,
}

impl Visualizer {
    pub fn animate<S: SceneHost>(&self, scene: &mut S, t_sec: f32) -> Result<(), SceneError> {
        let phase = self.emitter.phase();
        for (i, id) in self.rings.iter().enumerate() {
            let p = ring_pose(t_sec, i, phase);
            let t = Transform {
                translation: Vec3::ZERO,
                rotation: Quat::from_euler(EulerRot::XYZ, std::f32::consts::FRAC_PI_2, 0.0, p.spin),
                scale: Vec3::splat(p.scale),
            };
            scene.set_transform(*id, t)?;
            scene.set_opacity(*id, p.opacity)?;
        }
        Ok(())
    }
}

/// Flat targeting ring, hidden until the first hit.
pub fn reticle_node() -> SceneNode {
    let mut node = SceneNode::new("reticle").with_drawable(Drawable::new(
        Geometry::Ring {
            inner: RETICLE_INNER_RADIUS,
            outer: RETICLE_OUTER_RADIUS,
            segments: RETICLE_SEGMENTS,
        },
        Material::Basic(BasicMaterial {
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            transparent: false,
            wireframe: false,
        }),
    ));
    node.visible = false;
    node
}
