// Wire protocol DTOs for the JSON-lines snapshot stream.

use crate::domain::{BulletSnapshot, TankSnapshot};
use crate::use_cases::WorldUpdate;
use serde::Serialize;

/// Messages written to the output stream, one JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputMessage {
    // Arena bounds, sent once before the first snapshot.
    Arena { width: f32, height: f32 },
    // Snapshot of the world for a given tick.
    WorldUpdate(WorldUpdateDto),
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub tanks: Vec<TankDto>,
    pub bullets: Vec<BulletDto>,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            tanks: update.tanks.iter().map(TankDto::from).collect(),
            bullets: update.bullets.iter().map(BulletDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TankDto {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub rot: f32,
    pub hull: String,
    pub turret: String,
    pub live_projectiles: u8,
}

impl From<&TankSnapshot> for TankDto {
    fn from(tank: &TankSnapshot) -> Self {
        Self {
            id: tank.id.0,
            x: tank.x,
            y: tank.y,
            rot: tank.angle,
            hull: tank.hull_fill.clone(),
            turret: tank.turret_fill.clone(),
            live_projectiles: tank.live_projectiles,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletDto {
    pub id: u64,
    pub owner_id: u64,
    pub x: f32,
    pub y: f32,
}

impl From<&BulletSnapshot> for BulletDto {
    fn from(bullet: &BulletSnapshot) -> Self {
        Self {
            id: bullet.id.0,
            owner_id: bullet.owner_id.0,
            x: bullet.x,
            y: bullet.y,
        }
    }
}

pub fn encode(message: &OutputMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BulletId, TankId};
    use serde_json::json;

    #[test]
    fn when_world_update_is_encoded_then_it_is_tagged_and_flattened() {
        let update = WorldUpdate {
            tick: 30,
            tanks: vec![TankSnapshot {
                id: TankId(1),
                x: 400.0,
                y: 300.0,
                angle: 0.5,
                hull_fill: "red".to_string(),
                turret_fill: "blue".to_string(),
                live_projectiles: 2,
            }],
            bullets: vec![BulletSnapshot {
                id: BulletId(4),
                owner_id: TankId(1),
                x: 400.0,
                y: 258.0,
            }],
        };

        let line = encode(&OutputMessage::WorldUpdate(update.into())).expect("encodes");
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid json");

        assert_eq!(
            value,
            json!({
                "type": "WorldUpdate",
                "data": {
                    "tick": 30,
                    "tanks": [{
                        "id": 1, "x": 400.0, "y": 300.0, "rot": 0.5,
                        "hull": "red", "turret": "blue", "live_projectiles": 2
                    }],
                    "bullets": [{ "id": 4, "owner_id": 1, "x": 400.0, "y": 258.0 }]
                }
            })
        );
    }

    #[test]
    fn when_arena_message_is_encoded_then_it_fits_on_one_line() {
        let line = encode(&OutputMessage::Arena {
            width: 800.0,
            height: 600.0,
        })
        .expect("encodes");

        assert!(!line.contains('\n'));
        assert!(line.starts_with(r#"{"type":"Arena""#));
    }
}
