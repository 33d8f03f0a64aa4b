#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod optics;

use std::fmt;

use optics::{
    DisplacementProfile, GlassGeometry, ProfileKind, RasterBuffer, RoundedRect, SpecularOptions,
    SurfaceProfile, TraceResult, Vec2,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

// ─────────────────────────────────────────────────────────────────────────────
// Losse functies
// ─────────────────────────────────────────────────────────────────────────────

/// Evalueer een oppervlakprofiel op positie `x` in `[0, 1]`.
#[wasm_bindgen]
pub fn evaluate_profile(kind: &str, x: f64) -> Result<f64, JsValue> {
    let kind: ProfileKind = kind.parse().map_err(to_js_error)?;
    Ok(kind.height(x))
}

/// Bemonster een profiel op `count` gelijk verdeelde posities (voor grafieken).
#[wasm_bindgen]
pub fn sample_profile(kind: &str, count: usize) -> Result<Vec<f64>, JsValue> {
    let kind: ProfileKind = kind.parse().map_err(to_js_error)?;
    Ok(optics::sample_profile(&kind, count))
}

/// Bereken de 1D verplaatsingstabel over de afschuining.
///
/// Geeft `{ values, maxAbs }` terug.
#[wasm_bindgen]
pub fn compute_displacement_1d(
    kind: &str,
    bevel_width: f64,
    glass_thickness: f64,
    refractive_index: f64,
    sample_count: usize,
) -> Result<JsValue, JsValue> {
    let kind: ProfileKind = kind.parse().map_err(to_js_error)?;
    check_size("bevel_width", bevel_width)?;
    check_size("glass_thickness", glass_thickness)?;
    check_index(refractive_index)?;

    let table = optics::compute_displacement_1d(
        &kind,
        bevel_width,
        glass_thickness,
        refractive_index,
        sample_count,
    );
    to_js_value(&table)
}

/// Bouw de RGBA8 verplaatsingskaart voor een afgeronde rechthoek.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn compute_displacement_2d(
    width: usize,
    height: usize,
    object_width: f64,
    object_height: f64,
    corner_radius: f64,
    bevel_width: f64,
    max_abs: f64,
    values_1d: &[f64],
) -> Result<Vec<u8>, JsValue> {
    optics::compute_displacement_2d(
        width,
        height,
        object_width,
        object_height,
        corner_radius,
        bevel_width,
        max_abs,
        values_1d,
    )
    .map(RasterBuffer::into_vec)
    .map_err(to_js_error)
}

/// Bouw de spiegelende randlaag (RGBA8) voor een afgeronde rechthoek.
#[wasm_bindgen]
pub fn compute_specular_2d(
    width: usize,
    height: usize,
    object_width: f64,
    object_height: f64,
    corner_radius: f64,
    bevel_width: f64,
    angle: f64,
) -> Result<Vec<u8>, JsValue> {
    let shape = RoundedRect::new(object_width, object_height, corner_radius, bevel_width)
        .map_err(to_js_error)?;
    let options = SpecularOptions::default().angle(angle);
    optics::compute_specular_2d(width, height, &shape, &options)
        .map(RasterBuffer::into_vec)
        .map_err(to_js_error)
}

/// Breek een straal volgens de wet van Snellius.
///
/// Geeft `[x, y]` terug, of `undefined` bij totale interne reflectie of
/// ongeldige invoer.
#[wasm_bindgen]
pub fn refract(ix: f64, iy: f64, nx: f64, ny: f64, n1: f64, n2: f64) -> Option<Vec<f64>> {
    optics::refract_normalized(Vec2::new(ix, iy), Vec2::new(nx, ny), n1, n2)
        .and_then(optics::Refraction::direction)
        .map(|dir| dir.to_array().to_vec())
}

/// Opties voor het stralendiagram; ontbrekende velden krijgen standaardwaarden.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RayDiagramOptions {
    left: f64,
    width: f64,
    bevel_width: f64,
    thickness: f64,
    base: f64,
    span_start: f64,
    span_end: f64,
    ray_count: usize,
    n1: f64,
    n2: f64,
    aspect_normals: bool,
}

impl Default for RayDiagramOptions {
    fn default() -> Self {
        Self {
            left: 40.0,
            width: 320.0,
            bevel_width: 60.0,
            thickness: 50.0,
            base: 200.0,
            span_start: 0.0,
            span_end: 400.0,
            ray_count: 41,
            n1: optics::Medium::AIR.index,
            n2: optics::Medium::GLASS.index,
            aspect_normals: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct RayExport {
    path: Vec<[f64; 2]>,
    region: optics::Region,
    outcome: optics::TraceOutcome,
    displacement: f64,
}

impl From<&TraceResult> for RayExport {
    fn from(trace: &TraceResult) -> Self {
        Self {
            path: trace.path().into_iter().map(Vec2::to_array).collect(),
            region: trace.region,
            outcome: trace.outcome,
            displacement: trace.displacement,
        }
    }
}

/// Volg verticale stralen door een glasblok voor het stralendiagram.
#[wasm_bindgen]
pub fn trace_rays(kind: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let kind: ProfileKind = kind.parse().map_err(to_js_error)?;
    let options: RayDiagramOptions = if options.is_undefined() || options.is_null() {
        RayDiagramOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
    };
    check_index(options.n1)?;
    check_index(options.n2)?;

    let geometry = GlassGeometry::new(
        options.left,
        options.width,
        options.bevel_width,
        options.thickness,
        options.base,
    )
    .map_err(to_js_error)?
    .with_aspect_normals(options.aspect_normals);

    let rays: Vec<RayExport> = optics::trace_rays(
        &kind,
        &geometry,
        (options.span_start, options.span_end),
        options.ray_count,
        options.n1,
        options.n2,
    )
    .iter()
    .map(RayExport::from)
    .collect();

    to_js_value(&rays)
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulator
// ─────────────────────────────────────────────────────────────────────────────

/// Schuifregelaar met bereik en stapgrootte.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slider {
    name: &'static str,
    min: f64,
    max: f64,
    step: f64,
}

static SLIDERS: [Slider; 8] = [
    Slider { name: "bevel_width", min: 0.0, max: 150.0, step: 1.0 },
    Slider { name: "glass_thickness", min: 0.0, max: 200.0, step: 1.0 },
    Slider { name: "refractive_index", min: 1.0, max: 3.0, step: 0.01 },
    Slider { name: "object_width", min: 1.0, max: 1024.0, step: 1.0 },
    Slider { name: "object_height", min: 1.0, max: 1024.0, step: 1.0 },
    Slider { name: "corner_radius", min: 0.0, max: 512.0, step: 1.0 },
    Slider { name: "sample_count", min: 2.0, max: 1024.0, step: 1.0 },
    Slider { name: "specular_angle", min: -180.0, max: 180.0, step: 1.0 },
];

/// Huidige parameterset van de simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorParams {
    pub profile: ProfileKind,
    pub bevel_width: f64,
    pub glass_thickness: f64,
    pub refractive_index: f64,
    pub object_width: f64,
    pub object_height: f64,
    pub corner_radius: f64,
    pub sample_count: usize,
    /// Lichtrichting in graden.
    pub specular_angle: f64,
}

impl Default for SimulatorParams {
    fn default() -> Self {
        Self {
            profile: ProfileKind::ConvexSquircle,
            bevel_width: 40.0,
            glass_thickness: 60.0,
            refractive_index: optics::Medium::GLASS.index,
            object_width: 300.0,
            object_height: 200.0,
            corner_radius: 60.0,
            sample_count: 128,
            specular_angle: 60.0,
        }
    }
}

impl SimulatorParams {
    fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "bevel_width" => self.bevel_width,
            "glass_thickness" => self.glass_thickness,
            "refractive_index" => self.refractive_index,
            "object_width" => self.object_width,
            "object_height" => self.object_height,
            "corner_radius" => self.corner_radius,
            "sample_count" => self.sample_count as f64,
            "specular_angle" => self.specular_angle,
            _ => return None,
        })
    }

    fn set(&mut self, name: &str, value: f64) {
        match name {
            "bevel_width" => self.bevel_width = value,
            "glass_thickness" => self.glass_thickness = value,
            "refractive_index" => self.refractive_index = value,
            "object_width" => self.object_width = value,
            "object_height" => self.object_height = value,
            "corner_radius" => self.corner_radius = value,
            "sample_count" => self.sample_count = value as usize,
            "specular_angle" => self.specular_angle = value,
            _ => {}
        }
    }

    fn raster_size(&self) -> (usize, usize) {
        (
            self.object_width.ceil() as usize,
            self.object_height.ceil() as usize,
        )
    }

    fn shape(&self) -> Result<RoundedRect, optics::RasterError> {
        RoundedRect::new(
            self.object_width,
            self.object_height,
            self.corner_radius,
            self.bevel_width,
        )
    }
}

#[derive(Debug, Serialize)]
struct ParamExport {
    name: &'static str,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

#[derive(Debug, Clone)]
struct SimulatorResult {
    table: DisplacementProfile,
    displacement_map: RasterBuffer,
    specular_map: RasterBuffer,
}

/// Stateful ingang voor de presentatielaag: bewaart schuifregelaars en het
/// laatst berekende resultaat.
#[wasm_bindgen]
pub struct Simulator {
    params: SimulatorParams,
    result: Option<SimulatorResult>,
    result_dirty: bool,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Simulator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Simulator {
        Simulator {
            params: SimulatorParams::default(),
            result: None,
            result_dirty: true,
        }
    }

    /// Haal schuifregelaars met hun bereik op voor UI-generatie.
    #[wasm_bindgen]
    pub fn get_params(&self) -> Result<JsValue, JsValue> {
        let mut params = Vec::with_capacity(SLIDERS.len());
        for slider in &SLIDERS {
            params.push(ParamExport {
                name: slider.name,
                min: slider.min,
                max: slider.max,
                step: slider.step,
                value: self.params.get(slider.name).unwrap_or(slider.min),
            });
        }
        to_js_value(&params)
    }

    /// Stel een parameter in; de waarde wordt begrensd en afgerond op de stap.
    #[wasm_bindgen]
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        if !value.is_finite() {
            return Err(js_error("parameterwaarde moet een eindig getal zijn"));
        }

        let Some(slider) = find_param(name) else {
            return Err(js_error("onbekende parameter"));
        };

        let snapped = snap_to_step(value, slider);
        if self.params.get(slider.name) != Some(snapped) {
            self.params.set(slider.name, snapped);
            self.result_dirty = true;
        }
        Ok(())
    }

    /// Kies het oppervlakprofiel op naam.
    #[wasm_bindgen]
    pub fn set_profile(&mut self, kind: &str) -> Result<(), JsValue> {
        let kind: ProfileKind = kind.parse().map_err(to_js_error)?;
        if self.params.profile != kind {
            self.params.profile = kind;
            self.result_dirty = true;
        }
        Ok(())
    }

    #[wasm_bindgen]
    pub fn profile(&self) -> String {
        self.params.profile.name().to_owned()
    }

    /// Herbereken tabel en kaarten wanneer er iets gewijzigd is.
    #[wasm_bindgen]
    pub fn evaluate(&mut self) -> Result<(), JsValue> {
        if !self.result_dirty && self.result.is_some() {
            return Ok(());
        }

        let params = self.params;
        debug_log!("simulator: evaluatie met {params:?}");

        let shape = params.shape().map_err(to_js_error)?;
        let (width, height) = params.raster_size();

        let table = optics::compute_displacement_1d(
            &params.profile,
            params.bevel_width,
            params.glass_thickness,
            params.refractive_index,
            params.sample_count,
        );
        let field = optics::build_field_2d(width, height, &shape, &table.values)
            .map_err(to_js_error)?;
        let displacement_map =
            optics::encode_field(&field, table.max_abs).map_err(to_js_error)?;
        let specular = SpecularOptions::default().angle(params.specular_angle.to_radians());
        let specular_map =
            optics::compute_specular_2d(width, height, &shape, &specular).map_err(to_js_error)?;

        self.result = Some(SimulatorResult {
            table,
            displacement_map,
            specular_map,
        });
        self.result_dirty = false;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn raster_width(&self) -> usize {
        self.params.raster_size().0
    }

    #[wasm_bindgen]
    pub fn raster_height(&self) -> usize {
        self.params.raster_size().1
    }

    /// RGBA8 verplaatsingskaart van de laatste evaluatie.
    #[wasm_bindgen]
    pub fn displacement_map(&self) -> Result<Vec<u8>, JsValue> {
        Ok(self.current()?.displacement_map.data.clone())
    }

    /// RGBA8 spiegelende randlaag van de laatste evaluatie.
    #[wasm_bindgen]
    pub fn specular_map(&self) -> Result<Vec<u8>, JsValue> {
        Ok(self.current()?.specular_map.data.clone())
    }

    /// De 1D verplaatsingstabel (rand eerst).
    #[wasm_bindgen]
    pub fn profile_values(&self) -> Result<Vec<f64>, JsValue> {
        Ok(self.current()?.table.values.clone())
    }

    /// Grootste absolute verplaatsing; schaal voor het displacement-filter.
    #[wasm_bindgen]
    pub fn max_displacement(&self) -> Result<f64, JsValue> {
        Ok(self.current()?.table.max_abs)
    }
}

impl Simulator {
    /// Parameters zoals ze nu ingesteld zijn.
    #[must_use]
    pub fn params(&self) -> SimulatorParams {
        self.params
    }

    fn current(&self) -> Result<&SimulatorResult, JsValue> {
        if self.result_dirty {
            return Err(js_error("simulator is nog niet geëvalueerd"));
        }
        self.result
            .as_ref()
            .ok_or_else(|| js_error("simulator is nog niet geëvalueerd"))
    }
}

fn find_param(name: &str) -> Option<&'static Slider> {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }
    SLIDERS.iter().find(|slider| slider.name == normalized)
}

fn snap_to_step(value: f64, slider: &Slider) -> f64 {
    let mut clamped = clamp(value, slider.min, slider.max);
    if slider.step > 0.0 {
        clamped = slider.min + ((clamped - slider.min) / slider.step).round() * slider.step;
        clamped = clamp(clamped, slider.min, slider.max);
    }
    clamped
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['-', ' '], "_")
}

fn check_size(name: &str, value: f64) -> Result<(), JsValue> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(js_error(&format!(
            "`{name}` moet een eindig, niet-negatief getal zijn"
        )))
    }
}

fn check_index(value: f64) -> Result<(), JsValue> {
    if optics::Medium::new(value).is_some() {
        Ok(())
    } else {
        Err(js_error("brekingsindex moet een positief eindig getal zijn"))
    }
}

fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{SLIDERS, Simulator, find_param, refract, snap_to_step};
    use crate::optics::ProfileKind;

    #[test]
    fn param_lookup_normalizes_names() {
        assert_eq!(find_param("Bevel Width").map(|slider| slider.name), Some("bevel_width"));
        assert_eq!(find_param("glass-thickness").map(|slider| slider.name), Some("glass_thickness"));
        assert!(find_param("").is_none());
        assert!(find_param("onbekend").is_none());
    }

    #[test]
    fn snapping_clamps_and_rounds_to_step() {
        let index = find_param("refractive_index").unwrap();
        assert!((snap_to_step(1.504, index) - 1.5).abs() < 1e-9);
        assert!((snap_to_step(9.0, index) - 3.0).abs() < 1e-9);
        assert!((snap_to_step(0.2, index) - 1.0).abs() < 1e-9);

        for slider in &SLIDERS {
            assert!(slider.min < slider.max, "{} heeft een leeg bereik", slider.name);
        }
    }

    #[test]
    fn simulator_requires_evaluation_before_reading_maps() {
        let mut sim = Simulator::new();
        assert!(sim.displacement_map().is_err());

        sim.evaluate().expect("evaluate");
        let map = sim.displacement_map().expect("map");
        assert_eq!(map.len(), sim.raster_width() * sim.raster_height() * 4);
        assert!(sim.max_displacement().expect("max") > 0.0);

        sim.set_param("bevel_width", 20.0).expect("known param");
        assert!(sim.profile_values().is_err());
        assert!(sim.set_param("bestaat_niet", 1.0).is_err());
        assert!(sim.set_param("bevel_width", f64::NAN).is_err());
    }

    #[test]
    fn simulator_zero_bevel_yields_neutral_map() {
        let mut sim = Simulator::new();
        sim.set_param("bevel_width", 0.0).unwrap();
        sim.set_param("object_width", 16.0).unwrap();
        sim.set_param("object_height", 8.0).unwrap();
        sim.evaluate().unwrap();

        assert_eq!(sim.max_displacement().unwrap(), 0.0);
        let map = sim.displacement_map().unwrap();
        for pixel in map.chunks_exact(4) {
            assert_eq!(pixel, [128, 128, 255, 255]);
        }
    }

    #[test]
    fn simulator_profile_switch_marks_dirty() {
        let mut sim = Simulator::new();
        sim.evaluate().unwrap();
        sim.set_profile("lip").unwrap();
        assert_eq!(sim.params().profile, ProfileKind::Lip);
        assert_eq!(sim.profile(), "lip");
        assert!(sim.displacement_map().is_err());
        assert!(sim.set_profile("driehoek").is_err());
    }

    #[test]
    fn wasm_refract_returns_none_on_total_internal_reflection() {
        let straight = refract(0.0, 1.0, 0.0, -1.0, 1.0, 1.5).expect("no TIR");
        assert!(straight[0].abs() < 1e-12);
        assert!((straight[1] - 1.0).abs() < 1e-12);

        // 60 degrees from the normal inside glass exceeds the critical angle.
        let angle = 60f64.to_radians();
        assert!(refract(angle.sin(), angle.cos(), 0.0, -1.0, 1.5, 1.0).is_none());
        assert!(refract(0.0, 0.0, 0.0, -1.0, 1.0, 1.5).is_none());
    }
}
