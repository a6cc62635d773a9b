//! Integrated generator: analyze, synthesize a candidate spec, enforce, emit.
//!
//! The generator never repairs a rejected spec. A failed gate becomes
//! [`FramegateError::Enforcement`] with the full violation list and no code.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::analysis::content::{SceneAnalysis, SceneRole, analyze_scenes_with};
use crate::analysis::duration::{DurationPlan, synthesize_duration_with};
use crate::brand::palette::{BrandExtractor, ResolvedPalette, resolve_palette};
use crate::config::PolicyConfig;
use crate::enforce::rules::{EnforcementResult, enforce_learned_rules_with};
use crate::foundation::core::Canvas;
use crate::foundation::error::{EnforcementReport, FramegateError, FramegateResult};
use crate::generate::codegen::{TemplateContext, render_template, string_literal};
use crate::manifest::record::CompositionRecord;
use crate::manifest::writer::{ManifestHandle, write_atomic};
use crate::templates::catalog::{Platform, TemplateCatalog, TemplateField, TemplateRecord};
use crate::templates::scoring::{
    UserRequestAnalysis, analyze_user_request, rank_templates, score_template,
};
use crate::timeline::model::{
    AnimationSpec, ElementSpec, SceneDefinition, SceneSpec, TransformLevel, TransitionType,
};
use crate::timeline::validate::{Collision, check_spatial_collisions};
use crate::transform::isolation::IsolatedTransformBuilder;

/// A loose content brief.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Headline for the piece.
    pub title: Option<String>,
    /// One text per scene, in order.
    pub scenes: Vec<String>,
    /// Style keyword (`modern`, `corporate`, `playful`, ...).
    pub style: String,
    /// Brand asset handed to the palette extractor.
    pub brand_asset: Option<PathBuf>,
    /// Free-text brief used for template scoring; defaults to title + scenes + style.
    pub prompt: Option<String>,
    /// Pin a template instead of scoring the catalog.
    pub template_id: Option<String>,
    /// Closing call to action.
    pub cta: Option<String>,
    /// Target platform; inferred from the prompt when absent.
    pub platform: Option<Platform>,
}

impl GenerationRequest {
    /// Request with scene texts and a style.
    pub fn new<S: Into<String>>(scenes: impl IntoIterator<Item = S>, style: impl Into<String>) -> Self {
        Self {
            scenes: scenes.into_iter().map(Into::into).collect(),
            style: style.into(),
            ..Self::default()
        }
    }

    /// Parse a request from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramegateResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FramegateError::serde(format!("parse generation request JSON: {e}")))
    }

    fn validate(&self) -> FramegateResult<()> {
        if self.scenes.is_empty() {
            return Err(FramegateError::validation("request must contain at least one scene"));
        }
        if let Some(i) = self.scenes.iter().position(|s| s.trim().is_empty()) {
            return Err(FramegateError::validation(format!("scene {i} text is empty")));
        }
        Ok(())
    }

    fn has_field(&self, field: TemplateField) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match field {
            TemplateField::Title => present(&self.title),
            TemplateField::Scenes => !self.scenes.is_empty(),
            TemplateField::Cta => present(&self.cta),
            TemplateField::BrandAsset => self.brand_asset.is_some(),
        }
    }

    fn scoring_prompt(&self) -> String {
        if let Some(p) = self.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            return p.to_string();
        }
        let mut parts: Vec<&str> = Vec::new();
        if let Some(t) = self.title.as_deref() {
            parts.push(t);
        }
        parts.extend(self.scenes.iter().map(String::as_str));
        parts.push(self.style.as_str());
        parts.join(" ")
    }
}

/// Observability payload returned alongside generated code.
#[derive(Clone, Debug, serde::Serialize)]
pub struct GenerationMetadata {
    /// Template used.
    pub template_id: String,
    /// Its score against the request.
    pub template_score: f64,
    /// Why it was chosen.
    pub template_reason: String,
    /// Request analysis used for scoring.
    pub request: UserRequestAnalysis,
    /// Per-scene analysis.
    pub scenes: Vec<SceneAnalysis>,
    /// Frame budget.
    pub duration: DurationPlan,
    /// The gate's verdict (valid, possibly with warnings).
    pub enforcement: EnforcementResult,
    /// Palette and any fallback taken.
    pub palette: ResolvedPalette,
    /// Output canvas.
    pub canvas: Canvas,
    /// Element box overlaps per scene (diagnostic only).
    pub collisions: Vec<(String, Collision)>,
    /// xxh3 of the serialized spec.
    pub fingerprint: String,
}

/// Successful generation.
#[derive(Clone, Debug, serde::Serialize)]
pub struct GeneratedAnimation {
    /// Composition id.
    pub composition_id: String,
    /// Emitted source text.
    pub code: String,
    /// The validated spec the code was emitted from.
    pub spec: AnimationSpec,
    /// Sub-results for observability.
    pub metadata: GenerationMetadata,
}

/// Workspace the generator registers compositions into.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
    manifest: ManifestHandle,
}

impl Workspace {
    /// `root` is the directory holding the manifest file; components are written beneath it.
    pub fn new(root: impl Into<PathBuf>, manifest: ManifestHandle) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    /// Directory holding the manifest.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Runs the analyze → synthesize → enforce → emit pipeline.
pub struct Generator {
    policy: PolicyConfig,
    catalog: TemplateCatalog,
    extractor: Option<Arc<dyn BrandExtractor>>,
    workspace: Option<Workspace>,
}

impl Generator {
    /// Generator over the built-in catalog.
    pub fn new(policy: PolicyConfig) -> FramegateResult<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            catalog: TemplateCatalog::builtin(),
            extractor: None,
            workspace: None,
        })
    }

    /// Replace the template catalog.
    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Attach a brand-extraction collaborator.
    pub fn with_extractor(mut self, extractor: Arc<dyn BrandExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Write accepted components into `workspace` and register them in its manifest.
    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Policy in effect.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Catalog in effect.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Run the whole pipeline for one request.
    #[tracing::instrument(skip(self, request), fields(scenes = request.scenes.len()))]
    pub fn generate_animation(&self, request: &GenerationRequest) -> FramegateResult<GeneratedAnimation> {
        request.validate()?;
        let draft = self.draft(request)?;
        self.finish(request, draft)
    }

    /// Analyze the request and synthesize the candidate spec. Nothing is emitted yet.
    fn draft(&self, request: &GenerationRequest) -> FramegateResult<Draft<'_>> {
        let policy = &self.policy;

        let scenes = analyze_scenes_with(request.scenes.as_slice(), policy);
        let analysis = analyze_user_request(&request.scoring_prompt());
        let (template, template_score, template_reason) = self.choose_template(request, &analysis)?;

        let missing = missing_fields(template, request);
        if !missing.is_empty() {
            return Err(FramegateError::validation(format!(
                "template '{}' requires missing field(s): {}",
                template.id,
                missing.join(", ")
            )));
        }

        let palette = resolve_palette(
            self.extractor.as_deref(),
            request.brand_asset.as_deref(),
            &request.style,
        )?;
        let scene_count = u32::try_from(scenes.len())
            .map_err(|_| FramegateError::validation("too many scenes"))?;
        let duration = synthesize_duration_with(scene_count, policy)?;
        let canvas = request
            .platform
            .or(analysis.platform)
            .map(Platform::canvas)
            .unwrap_or(Canvas::LANDSCAPE);

        let spec = build_spec(request, &scenes, &duration, canvas, policy);
        Ok(Draft {
            template,
            template_score,
            template_reason,
            analysis,
            scenes,
            duration,
            palette,
            canvas,
            spec,
        })
    }

    /// Gate the drafted spec, then emit and register. A rejected spec returns before any
    /// code is rendered or written.
    fn finish(&self, request: &GenerationRequest, draft: Draft<'_>) -> FramegateResult<GeneratedAnimation> {
        let Draft {
            template,
            template_score,
            template_reason,
            analysis,
            scenes,
            duration,
            palette,
            canvas,
            spec,
        } = draft;
        let policy = &self.policy;

        let fingerprint = fingerprint_spec(&spec)?;
        let composition_id = composition_id(request, template, &fingerprint);

        let enforcement = enforce_learned_rules_with(&spec, policy);
        if !enforcement.valid {
            return Err(FramegateError::Enforcement(Box::new(EnforcementReport {
                composition: composition_id,
                result: enforcement,
            })));
        }

        let collisions = spec
            .scenes
            .iter()
            .flat_map(|s| {
                // The shot box is the frame itself; only check what sits inside it.
                let inner: Vec<ElementSpec> = s
                    .elements
                    .iter()
                    .filter(|e| e.level != TransformLevel::Shot)
                    .cloned()
                    .collect();
                check_spatial_collisions(&inner)
                    .into_iter()
                    .map(|c| (s.definition.name.clone(), c))
            })
            .collect();

        let ctx = template_context(
            request,
            template,
            &spec,
            &scenes,
            &palette,
            canvas,
            &composition_id,
            &fingerprint,
            policy,
        )?;
        let code = render_template(&template.skeleton, &ctx)?;

        if let Some(ws) = &self.workspace {
            register(ws, template, &composition_id, &code, spec.total_duration)?;
        }

        tracing::info!(
            composition = %composition_id,
            template = %template.id,
            frames = spec.total_duration,
            "generated animation"
        );

        Ok(GeneratedAnimation {
            composition_id,
            code,
            metadata: GenerationMetadata {
                template_id: template.id.clone(),
                template_score,
                template_reason,
                request: analysis,
                scenes,
                duration,
                enforcement,
                palette,
                canvas,
                collisions,
                fingerprint,
            },
            spec,
        })
    }

    /// Run independent requests in parallel. Each request owns its data; results keep input order.
    pub fn generate_batch(
        &self,
        requests: &[GenerationRequest],
    ) -> Vec<FramegateResult<GeneratedAnimation>> {
        requests
            .par_iter()
            .map(|r| self.generate_animation(r))
            .collect()
    }

    fn choose_template<'a>(
        &'a self,
        request: &GenerationRequest,
        analysis: &UserRequestAnalysis,
    ) -> FramegateResult<(&'a TemplateRecord, f64, String)> {
        if let Some(id) = request.template_id.as_deref() {
            let t = self.catalog.get(id)?;
            return Ok((t, score_template(t, analysis), "requested explicitly".to_string()));
        }
        // Best-scoring template the request can actually fill; otherwise the top one, which then
        // fails the required-field check with a precise message.
        let ranked = rank_templates(&self.catalog, analysis, self.catalog.len());
        let best = ranked
            .iter()
            .find(|m| missing_fields(m.template, request).is_empty())
            .or_else(|| ranked.first())
            .ok_or_else(|| FramegateError::not_found("template", "<empty catalog>"))?;
        Ok((best.template, best.score, best.reason.clone()))
    }
}

fn missing_fields(template: &TemplateRecord, request: &GenerationRequest) -> Vec<&'static str> {
    template
        .required_fields
        .iter()
        .filter(|f| !request.has_field(**f))
        .map(|f| f.as_str())
        .collect()
}

struct Draft<'a> {
    template: &'a TemplateRecord,
    template_score: f64,
    template_reason: String,
    analysis: UserRequestAnalysis,
    scenes: Vec<SceneAnalysis>,
    duration: DurationPlan,
    palette: ResolvedPalette,
    canvas: Canvas,
    spec: AnimationSpec,
}

fn pick_exit(
    index: usize,
    scenes: &[SceneAnalysis],
    policy: &PolicyConfig,
) -> (TransitionType, u64) {
    let tf = u64::from(policy.transition_frames);
    let (Some(cur), Some(next)) = (scenes.get(index), scenes.get(index + 1)) else {
        return (TransitionType::HardCut, 0);
    };
    if tf == 0 {
        return (TransitionType::HardCut, 0);
    }
    let delta = (cur.content.energy - next.content.energy).abs();
    if delta > policy.energy_cut_threshold {
        (TransitionType::HardCut, 0)
    } else if cur.similarity_to_next >= policy.similarity_crossfade_threshold {
        (TransitionType::CrossfadeScale, tf)
    } else {
        (TransitionType::WIPES[index % TransitionType::WIPES.len()], tf)
    }
}

fn scene_name(role: SceneRole, index: usize) -> String {
    match role {
        SceneRole::Intro => "Intro".to_string(),
        SceneRole::Body => format!("Body{index}"),
        SceneRole::Outro => "Outro".to_string(),
    }
}

fn shot_zoom(energy: f64, policy: &PolicyConfig) -> f64 {
    let zoom = 1.0 + 0.1 * energy.clamp(0.0, 1.0);
    // Two decimals keep the emitted code readable.
    (zoom.min(policy.shot_scale_ceiling) * 100.0).round() / 100.0
}

fn headline_velocity(energy: f64) -> f64 {
    2.0 + 60.0 * energy.clamp(0.0, 1.0)
}

fn build_spec(
    request: &GenerationRequest,
    scenes: &[SceneAnalysis],
    duration: &DurationPlan,
    canvas: Canvas,
    policy: &PolicyConfig,
) -> AnimationSpec {
    let hold = u64::from(policy.frames_per_scene);
    let step = hold + u64::from(policy.transition_frames);
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);

    let mut out = Vec::with_capacity(scenes.len());
    let mut prev_exit: Option<TransitionType> = None;
    for (i, analysis) in scenes.iter().enumerate() {
        let start = i as u64 * step;
        let last = i + 1 == scenes.len();
        let end = if last { start + hold } else { start + step };
        let (exit_type, exit_duration) = pick_exit(i, scenes, policy);

        let mut def = SceneDefinition::new(
            scene_name(analysis.scene_role, i),
            start,
            end,
            exit_type,
            exit_duration,
        );
        def.entry_transition = prev_exit;
        prev_exit = Some(exit_type);

        let energy = analysis.content.energy;
        let mut shot = ElementSpec::new("shot", TransformLevel::Shot, w, h);
        shot.scale = Some(shot_zoom(energy, policy));

        let mut headline = ElementSpec::new("headline", TransformLevel::Element, w * 0.8, h * 0.2);
        headline.x = w * 0.1;
        headline.y = h * 0.4;
        let velocity = headline_velocity(energy);
        headline.velocity = Some(velocity);
        headline.has_motion_blur = velocity > policy.motion_blur_threshold_for(headline.size_px());

        let mut scene = SceneSpec::new(def).element(shot).element(headline);
        scene.text = request.scenes[i].clone();

        if analysis.content.features.has_code_examples {
            let mut code = ElementSpec::new("code-block", TransformLevel::Element, w * 0.8, h * 0.3);
            code.x = w * 0.1;
            code.y = h * 0.62;
            scene = scene.element(code);
        }
        if last && request.has_field(TemplateField::Cta) {
            let mut cta = ElementSpec::new("cta-button", TransformLevel::Element, w * 0.3, h * 0.1);
            cta.x = w * 0.35;
            cta.y = h * 0.75;
            scene = scene.element(cta);
        }
        out.push(scene);
    }

    AnimationSpec {
        scenes: out,
        total_duration: duration.total_frames,
    }
}

fn fingerprint_spec(spec: &AnimationSpec) -> FramegateResult<String> {
    let bytes = serde_json::to_vec(spec)
        .map_err(|e| FramegateError::serde(format!("serialize spec: {e}")))?;
    Ok(format!("{:016x}", xxhash_rust::xxh3::xxh3_64(&bytes)))
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn composition_id(request: &GenerationRequest, template: &TemplateRecord, fingerprint: &str) -> String {
    let slug = request.title.as_deref().map(slugify).unwrap_or_default();
    if slug.is_empty() {
        format!("{}-{}", template.id, &fingerprint[..8])
    } else {
        slug
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenePayload<'a> {
    name: &'a str,
    role: SceneRole,
    from: u64,
    duration_in_frames: u64,
    entry: &'static str,
    exit: &'static str,
    exit_frames: u64,
    text: &'a str,
    energy: f64,
    shot_transform: String,
    headline_transform: String,
    motion_blur: bool,
}

#[allow(clippy::too_many_arguments)]
fn template_context(
    request: &GenerationRequest,
    template: &TemplateRecord,
    spec: &AnimationSpec,
    scenes: &[SceneAnalysis],
    palette: &ResolvedPalette,
    canvas: Canvas,
    composition_id: &str,
    fingerprint: &str,
    policy: &PolicyConfig,
) -> FramegateResult<TemplateContext> {
    let payload: Vec<ScenePayload<'_>> = spec
        .scenes
        .iter()
        .zip(scenes)
        .map(|(scene, analysis)| {
            let def = &scene.definition;
            let shot_scale = scene
                .elements
                .iter()
                .find(|e| e.level == TransformLevel::Shot)
                .and_then(|e| e.scale)
                .unwrap_or(1.0);
            let headline = scene.elements.iter().find(|e| e.kind == "headline");
            let rise = if analysis.scene_role == SceneRole::Intro { -24.0 } else { -12.0 };
            ScenePayload {
                name: &def.name,
                role: analysis.scene_role,
                from: def.start_frame,
                duration_in_frames: def.duration_frames(),
                entry: def.entry_transition.map_or("none", |t| t.as_str()),
                exit: def.exit_type.as_str(),
                exit_frames: def.exit_duration,
                text: &scene.text,
                energy: (analysis.content.energy * 100.0).round() / 100.0,
                shot_transform: IsolatedTransformBuilder::new(TransformLevel::Shot)
                    .scale(shot_scale)
                    .to_css(),
                headline_transform: IsolatedTransformBuilder::new(TransformLevel::Element)
                    .translate_y(rise)
                    .to_css(),
                motion_blur: headline.is_some_and(|h| h.has_motion_blur),
            }
        })
        .collect();
    let scenes_json = serde_json::to_string_pretty(&payload)
        .map_err(|e| FramegateError::serde(format!("serialize scene payload: {e}")))?;

    let p = &palette.palette;
    let mut ctx = TemplateContext::new();
    ctx.set("COMPOSITION_ID", composition_id)
        .set("TEMPLATE_ID", template.id.as_str())
        .set("FINGERPRINT", fingerprint)
        .set(
            "TITLE",
            string_literal(request.title.as_deref().unwrap_or(""))?,
        )
        .set(
            "CTA",
            match request.cta.as_deref() {
                Some(c) => string_literal(c)?,
                None => "null".to_string(),
            },
        )
        .set("FPS", policy.fps.as_f64().round().to_string())
        .set("WIDTH", canvas.width.to_string())
        .set("HEIGHT", canvas.height.to_string())
        .set("TOTAL_FRAMES", spec.total_duration.to_string())
        .set("HAS_SCHEMA", template.has_schema.to_string())
        .set("SCENES_JSON", scenes_json)
        .set("PALETTE_PRIMARY", p.primary.as_str())
        .set("PALETTE_SECONDARY", p.secondary.as_str())
        .set("PALETTE_ACCENT", p.accent.as_str())
        .set("PALETTE_BACKGROUND", p.background.as_str())
        .set("PALETTE_TEXT", p.text.as_str());
    Ok(ctx)
}

fn register(
    ws: &Workspace,
    template: &TemplateRecord,
    composition_id: &str,
    code: &str,
    duration: u64,
) -> FramegateResult<()> {
    let rel = format!("{}/{composition_id}.tsx", template.component_path.trim_end_matches('/'));
    let path = ws.root.join(&rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            FramegateError::manifest(format!("create component dir '{}': {e}", parent.display()))
        })?;
    }
    let previous = std::fs::read_to_string(&path).ok();
    write_atomic(&path, code)?;
    let upserted = ws.manifest.upsert(vec![CompositionRecord {
        name: composition_id.to_string(),
        template_path: format!("./{rel}"),
        duration,
        has_schema: template.has_schema,
    }]);
    if let Err(e) = upserted {
        // An unregistered component must not outlive a failed registration.
        let rollback = match &previous {
            Some(old) => write_atomic(&path, old),
            None => std::fs::remove_file(&path).map_err(|e| {
                FramegateError::manifest(format!("remove '{}': {e}", path.display()))
            }),
        };
        if let Err(re) = rollback {
            tracing::warn!(path = %path.display(), error = %re, "component rollback failed");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/generate/generator.rs"]
mod tests;
