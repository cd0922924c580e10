//! Atomic grid cell.
//!
//! A [`Tile`] is a plain value type exclusively owned by its chunk. It is
//! mutated by the chunk updater, or by external collaborators through
//! `WorldGrid::tile_at_mut` — who must then mark the tile dirty so the
//! change is picked up on the next scheduled pass.

use serde::{Deserialize, Serialize};

use crate::config::SERVICE_CHANNELS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    #[default]
    Grass,
    Water,
    Road,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ZoneKind {
    #[default]
    None,
    Residential,
    Commercial,
    Industrial,
}

impl ZoneKind {
    pub fn is_residential(self) -> bool {
        self == ZoneKind::Residential
    }

    pub fn is_job_zone(self) -> bool {
        matches!(self, ZoneKind::Commercial | ZoneKind::Industrial)
    }
}

/// Index into a tile's service-coverage array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    Power,
    Water,
    Police,
    Fire,
    Health,
    Education,
    Parks,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; SERVICE_CHANNELS] = [
        ServiceKind::Power,
        ServiceKind::Water,
        ServiceKind::Police,
        ServiceKind::Fire,
        ServiceKind::Health,
        ServiceKind::Education,
        ServiceKind::Parks,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Tile {
    pub kind: TileKind,
    pub zone: ZoneKind,
    pub height: u8,
    pub density: u8,
    /// External building id; never an owning handle.
    pub building: Option<u32>,
    pub powered: bool,
    pub watered: bool,
    pub abandoned: bool,
    /// Coverage value per [`ServiceKind`], 0..=255.
    pub services: [u8; SERVICE_CHANNELS],
    pub population: u16,
    pub jobs: u16,
    pub land_value: u16,
    pub pollution: u8,
    pub crime: u8,
    pub happiness: u8,
    pub tax_revenue: u16,
    /// Directional flow counters: north, east, south, west.
    pub traffic: [u16; 4],
}

impl Tile {
    #[inline]
    pub fn service(&self, kind: ServiceKind) -> u8 {
        self.services[kind as usize]
    }

    #[inline]
    pub fn set_service(&mut self, kind: ServiceKind, coverage: u8) {
        self.services[kind as usize] = coverage;
    }

    pub fn has_utilities(&self) -> bool {
        self.powered && self.watered
    }

    /// Blended attractiveness in 0..=1 used by the growth hooks: service
    /// coverage and land value pull up, pollution and crime pull down.
    pub fn desirability(&self) -> f32 {
        let services: u32 = self.services.iter().map(|&s| s as u32).sum();
        let services = services as f32 / (SERVICE_CHANNELS as f32 * 255.0);
        let land = self.land_value as f32 / u16::MAX as f32;
        let pollution = 1.0 - self.pollution as f32 / 255.0;
        let safety = 1.0 - self.crime as f32 / 255.0;
        services * 0.5 + land * 0.25 + pollution * 0.15 + safety * 0.10
    }
}
