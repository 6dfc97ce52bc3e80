//! Weather parameters, named presets, and partial weather patches.
//!
//! Scenario authors usually change only a handful of fields ("more rain,
//! denser fog") and keep the rest of the current weather.  A
//! [`WeatherPatch`] captures exactly those fields; unknown field names coming
//! from user-editable definitions are logged and dropped rather than failing
//! the scenario.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

// ── WeatherParameters ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeatherParameters {
    pub cloudiness:                f32,
    pub precipitation:             f32,
    pub precipitation_deposits:    f32,
    pub wind_intensity:            f32,
    pub sun_azimuth_angle:         f32,
    pub sun_altitude_angle:        f32,
    pub fog_density:               f32,
    pub fog_distance:              f32,
    pub fog_falloff:               f32,
    pub wetness:                   f32,
    pub scattering_intensity:      f32,
    pub mie_scattering_scale:      f32,
    pub rayleigh_scattering_scale: f32,
}

impl Default for WeatherParameters {
    /// Clear noon.
    fn default() -> Self {
        Self {
            cloudiness:                5.0,
            precipitation:             0.0,
            precipitation_deposits:    0.0,
            wind_intensity:            10.0,
            sun_azimuth_angle:         -1.0,
            sun_altitude_angle:        45.0,
            fog_density:               2.0,
            fog_distance:              0.75,
            fog_falloff:               0.1,
            wetness:                   0.0,
            scattering_intensity:      1.0,
            mie_scattering_scale:      0.03,
            rayleigh_scattering_scale: 0.0331,
        }
    }
}

impl WeatherParameters {
    /// Look up a named preset.  Returns `None` for unknown names.
    pub fn preset(name: &str) -> Option<WeatherParameters> {
        let base = WeatherParameters::default();
        let preset = match name {
            "ClearNoon" => base,
            "ClearSunset" => WeatherParameters {
                cloudiness:         15.0,
                sun_altitude_angle: 15.0,
                ..base
            },
            "WetNoon" => WeatherParameters {
                cloudiness:             5.0,
                precipitation_deposits: 50.0,
                wetness:                50.0,
                ..base
            },
            "MidRainyNoon" => WeatherParameters {
                cloudiness:             60.0,
                precipitation:          60.0,
                precipitation_deposits: 60.0,
                wind_intensity:         60.0,
                wetness:                60.0,
                ..base
            },
            "HardRainNight" => WeatherParameters {
                cloudiness:             100.0,
                precipitation:          100.0,
                precipitation_deposits: 90.0,
                wind_intensity:         100.0,
                sun_altitude_angle:     -90.0,
                fog_density:            7.0,
                wetness:                100.0,
                ..base
            },
            _ => return None,
        };
        Some(preset)
    }

    pub fn get(&self, field: WeatherField) -> f32 {
        match field {
            WeatherField::Cloudiness              => self.cloudiness,
            WeatherField::Precipitation           => self.precipitation,
            WeatherField::PrecipitationDeposits   => self.precipitation_deposits,
            WeatherField::WindIntensity           => self.wind_intensity,
            WeatherField::SunAzimuthAngle         => self.sun_azimuth_angle,
            WeatherField::SunAltitudeAngle        => self.sun_altitude_angle,
            WeatherField::FogDensity              => self.fog_density,
            WeatherField::FogDistance             => self.fog_distance,
            WeatherField::FogFalloff              => self.fog_falloff,
            WeatherField::Wetness                 => self.wetness,
            WeatherField::ScatteringIntensity     => self.scattering_intensity,
            WeatherField::MieScatteringScale      => self.mie_scattering_scale,
            WeatherField::RayleighScatteringScale => self.rayleigh_scattering_scale,
        }
    }

    pub fn set(&mut self, field: WeatherField, value: f32) {
        let slot = match field {
            WeatherField::Cloudiness              => &mut self.cloudiness,
            WeatherField::Precipitation           => &mut self.precipitation,
            WeatherField::PrecipitationDeposits   => &mut self.precipitation_deposits,
            WeatherField::WindIntensity           => &mut self.wind_intensity,
            WeatherField::SunAzimuthAngle         => &mut self.sun_azimuth_angle,
            WeatherField::SunAltitudeAngle        => &mut self.sun_altitude_angle,
            WeatherField::FogDensity              => &mut self.fog_density,
            WeatherField::FogDistance             => &mut self.fog_distance,
            WeatherField::FogFalloff              => &mut self.fog_falloff,
            WeatherField::Wetness                 => &mut self.wetness,
            WeatherField::ScatteringIntensity     => &mut self.scattering_intensity,
            WeatherField::MieScatteringScale      => &mut self.mie_scattering_scale,
            WeatherField::RayleighScatteringScale => &mut self.rayleigh_scattering_scale,
        };
        *slot = value;
    }
}

// ── WeatherField ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeatherField {
    Cloudiness,
    Precipitation,
    PrecipitationDeposits,
    WindIntensity,
    SunAzimuthAngle,
    SunAltitudeAngle,
    FogDensity,
    FogDistance,
    FogFalloff,
    Wetness,
    ScatteringIntensity,
    MieScatteringScale,
    RayleighScatteringScale,
}

impl WeatherField {
    pub fn as_str(self) -> &'static str {
        match self {
            WeatherField::Cloudiness              => "cloudiness",
            WeatherField::Precipitation           => "precipitation",
            WeatherField::PrecipitationDeposits   => "precipitation_deposits",
            WeatherField::WindIntensity           => "wind_intensity",
            WeatherField::SunAzimuthAngle         => "sun_azimuth_angle",
            WeatherField::SunAltitudeAngle        => "sun_altitude_angle",
            WeatherField::FogDensity              => "fog_density",
            WeatherField::FogDistance             => "fog_distance",
            WeatherField::FogFalloff              => "fog_falloff",
            WeatherField::Wetness                 => "wetness",
            WeatherField::ScatteringIntensity     => "scattering_intensity",
            WeatherField::MieScatteringScale      => "mie_scattering_scale",
            WeatherField::RayleighScatteringScale => "rayleigh_scattering_scale",
        }
    }
}

impl FromStr for WeatherField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "cloudiness"                => WeatherField::Cloudiness,
            "precipitation"             => WeatherField::Precipitation,
            "precipitation_deposits"    => WeatherField::PrecipitationDeposits,
            "wind_intensity"            => WeatherField::WindIntensity,
            "sun_azimuth_angle"         => WeatherField::SunAzimuthAngle,
            "sun_altitude_angle"        => WeatherField::SunAltitudeAngle,
            "fog_density"               => WeatherField::FogDensity,
            "fog_distance"              => WeatherField::FogDistance,
            "fog_falloff"               => WeatherField::FogFalloff,
            "wetness"                   => WeatherField::Wetness,
            "scattering_intensity"      => WeatherField::ScatteringIntensity,
            "mie_scattering_scale"      => WeatherField::MieScatteringScale,
            "rayleigh_scattering_scale" => WeatherField::RayleighScatteringScale,
            other => return Err(format!("unknown weather parameter {other:?}")),
        };
        Ok(field)
    }
}

impl fmt::Display for WeatherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── WeatherPatch ──────────────────────────────────────────────────────────────

/// A partial weather update.  Later entries for the same field win.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeatherPatch {
    pub fields: Vec<(WeatherField, f32)>,
}

impl WeatherPatch {
    /// Build a patch from `(name, value)` pairs, skipping unknown names.
    pub fn from_pairs<'a, I>(pairs: I) -> WeatherPatch
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let fields = pairs
            .into_iter()
            .filter_map(|(name, value)| match name.parse::<WeatherField>() {
                Ok(field) => Some((field, value)),
                Err(e) => {
                    warn!(error = %e, "weather_field_skipped");
                    None
                }
            })
            .collect();
        WeatherPatch { fields }
    }

    /// Patch that overwrites every field with the values of `preset`.
    pub fn full(preset: &WeatherParameters) -> WeatherPatch {
        use WeatherField::*;
        let fields = [
            Cloudiness, Precipitation, PrecipitationDeposits, WindIntensity,
            SunAzimuthAngle, SunAltitudeAngle, FogDensity, FogDistance, FogFalloff,
            Wetness, ScatteringIntensity, MieScatteringScale, RayleighScatteringScale,
        ]
        .into_iter()
        .map(|f| (f, preset.get(f)))
        .collect();
        WeatherPatch { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply on top of `base` and return the result.
    pub fn apply(&self, base: WeatherParameters) -> WeatherParameters {
        let mut out = base;
        for &(field, value) in &self.fields {
            out.set(field, value);
        }
        out
    }
}
