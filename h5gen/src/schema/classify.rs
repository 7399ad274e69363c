//! Field classification.
//!
//! A field is matched against an ordered list of matchers; the first one that
//! accepts it decides its [`FieldKind`]. Matchers look at the structural type
//! tree. The declaration tokens are consulted only to recover template
//! arguments the provider did not list.
//!
//! Two-dimensional shapes are recognised by [`detect_matrix`], which is kept
//! apart from the matcher list: a matrix field still classifies as
//! `Unsupported` and the detection only refines the diagnostic.

use crate::config::ClassifierConfig;
use crate::schema::kind::{ArrayLength, FieldKind};
use crate::schema::registry::GeneratedTypesRegistry;
use h5gen_types::{ArraySizeKind, FieldDescriptor, TypeDescriptor, TypeShape, bare_type_spelling};
use serde_derive::Serialize;
use std::fmt;

/// State visible to a matcher. `ty` is the field's type, or the pointee
/// when a raw pointer has been unwrapped.
pub struct ClassifyCtx<'a> {
    pub field: &'a FieldDescriptor,
    pub ty: &'a TypeDescriptor,
    pub registry: &'a GeneratedTypesRegistry,
    top_level: bool,
}

impl<'a> ClassifyCtx<'a> {
    /// Token text only describes the declared type, not a pointee.
    fn template_arguments(&self) -> Vec<String> {
        if self.top_level { self.field.template_arguments() } else { self.ty.template_arguments() }
    }
}

pub type Matcher = fn(&FieldClassifier, &ClassifyCtx<'_>) -> Option<FieldKind>;

/// Matchers in priority order.
pub const MATCHERS: &[(&str, Matcher)] = &[
    ("fixed-array", match_fixed_array),
    ("vector", match_vector),
    ("string", match_string),
    ("c-string", match_c_string),
    ("raw-pointer", match_raw_pointer),
    ("smart-pointer", match_smart_pointer),
    ("scalar", match_scalar),
    ("anonymous", match_anonymous),
    ("enum", match_enum),
    ("registered-record", match_registered_record),
    ("unregistered-record", match_unregistered_record),
];

/// Name reported for fields no matcher accepts.
pub const FALLBACK: &str = "unsupported";

/// Result of classification together with the matcher that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: FieldKind,
    pub matched_by: &'static str,
}

#[derive(Debug, Clone)]
pub struct FieldClassifier {
    config: ClassifierConfig,
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl FieldClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Map `field` to exactly one [`FieldKind`]. Never fails.
    pub fn classify(&self, field: &FieldDescriptor, registry: &GeneratedTypesRegistry) -> FieldKind {
        self.classify_traced(field, registry).kind
    }

    pub fn classify_traced(&self, field: &FieldDescriptor, registry: &GeneratedTypesRegistry) -> Classification {
        self.classify_type(field, &field.ty, registry, true)
    }

    fn classify_type(
        &self,
        field: &FieldDescriptor,
        ty: &TypeDescriptor,
        registry: &GeneratedTypesRegistry,
        top_level: bool,
    ) -> Classification {
        let ctx = ClassifyCtx { field, ty, registry, top_level };
        for &(name, matcher) in MATCHERS {
            if let Some(kind) = matcher(self, &ctx) {
                return Classification { kind, matched_by: name };
            }
        }
        Classification { kind: FieldKind::Unsupported { type_name: ty.spelling.clone() }, matched_by: FALLBACK }
    }

    fn is_vector_template(&self, head: &str) -> bool {
        names_contain(&self.config.vector_templates, head)
    }

    fn is_fixed_array_template(&self, head: &str) -> bool {
        names_contain(&self.config.fixed_array_templates, head)
    }

    fn is_container_spelling(&self, spelling: &str) -> bool {
        spelling_head(spelling).is_some_and(|head| self.is_vector_template(&head) || self.is_fixed_array_template(&head))
    }
}

fn strip_global(name: &str) -> &str {
    name.trim().strip_prefix("::").unwrap_or(name.trim())
}

fn names_contain(names: &[String], candidate: &str) -> bool {
    let candidate = strip_global(candidate);
    names.iter().any(|name| strip_global(name) == candidate)
}

fn last_segment(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Template name of a spelled type such as `std::vector<int>`.
fn spelling_head(spelling: &str) -> Option<String> {
    let bare = bare_type_spelling(spelling);
    bare.find('<').map(|pos| bare[..pos].trim().to_string())
}

fn type_name(ty: &TypeDescriptor) -> String {
    match &ty.shape {
        TypeShape::Builtin(b) if ty.spelling.trim().is_empty() => b.builtin.cpp_spelling().to_string(),
        _ => ty.bare_spelling(),
    }
}

/// `T[N]`, `T[LEN]` with `LEN` defined in the header, or a bounded container
/// such as `std::array<T, N>`. Arrays of arrays are left for later matchers.
pub fn match_fixed_array(classifier: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    if let TypeShape::Array(array) = &ctx.ty.shape {
        if !matches!(array.size_kind, ArraySizeKind::Constant | ArraySizeKind::Incomplete) {
            return None;
        }
        if matches!(array.element.shape, TypeShape::Array(_)) {
            return None;
        }
        let length = match (array.count, &array.count_expr) {
            (Some(count), _) => ArrayLength::Literal(count),
            (None, Some(expr)) if !expr.trim().is_empty() => ArrayLength::Symbolic(expr.trim().to_string()),
            _ => return None,
        };
        return Some(FieldKind::FixedArray1D { element_type: type_name(&array.element), length });
    }

    let head = ctx.ty.template_head()?;
    if !classifier.is_fixed_array_template(&head) {
        return None;
    }
    let args = ctx.template_arguments();
    let [element, length] = args.as_slice() else {
        return None;
    };
    if classifier.is_container_spelling(element) {
        return None;
    }
    let length = match length.parse::<u64>() {
        Ok(count) => ArrayLength::Literal(count),
        Err(_) => ArrayLength::Symbolic(length.clone()),
    };
    Some(FieldKind::FixedArray1D { element_type: bare_type_spelling(element), length })
}

/// Single-level dynamic container. A container of containers is a matrix.
pub fn match_vector(classifier: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    let head = ctx.ty.template_head()?;
    if !classifier.is_vector_template(&head) {
        return None;
    }
    let args = ctx.template_arguments();
    let element = args.first()?;
    if classifier.is_container_spelling(element) {
        return None;
    }
    Some(FieldKind::VariableVector { element_type: bare_type_spelling(element) })
}

pub fn match_string(classifier: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    let strings = &classifier.config.string_types;
    let by_spelling = names_contain(strings, &ctx.ty.bare_spelling());
    let by_head = ctx.ty.template_head().is_some_and(|head| names_contain(strings, &head));
    let by_decl = match &ctx.ty.shape {
        TypeShape::Record(record) => {
            names_contain(strings, &record.decl)
                || spelling_head(&record.decl).is_some_and(|head| names_contain(strings, &head))
        }
        _ => false,
    };
    (by_spelling || by_head || by_decl).then_some(FieldKind::VariableString)
}

/// Single pointer to a configured character type.
pub fn match_c_string(classifier: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    let TypeShape::Pointer(pointer) = &ctx.ty.shape else {
        return None;
    };
    match &pointer.pointee.shape {
        TypeShape::Builtin(b) if classifier.config.char_types.contains(&b.builtin) => Some(FieldKind::CStyleString),
        _ => None,
    }
}

/// Unwrap one pointer level and classify the pointee. Deeper indirection
/// is unsupported and left to [`detect_matrix`]. A pointer to a dynamic
/// container has no handle to mirror it.
pub fn match_raw_pointer(classifier: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    let TypeShape::Pointer(pointer) = &ctx.ty.shape else {
        return None;
    };
    let unsupported = || FieldKind::Unsupported { type_name: ctx.ty.spelling.clone() };
    if ctx.ty.pointer_depth() > 1 {
        return Some(unsupported());
    }
    match classifier.classify_type(ctx.field, &pointer.pointee, ctx.registry, false).kind {
        kind if kind.is_variable_length() => Some(unsupported()),
        FieldKind::Unsupported { .. } => Some(unsupported()),
        kind => Some(kind),
    }
}

/// Wrapper names are compared by their last segment, so `std::shared_ptr`
/// and `boost::shared_ptr` both match `shared_ptr`.
pub fn match_smart_pointer(classifier: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    let head = ctx.ty.template_head()?;
    let wrapper = last_segment(&head);
    classifier
        .config
        .smart_pointers
        .iter()
        .any(|name| last_segment(strip_global(name)) == wrapper)
        .then(|| FieldKind::SkippedSmartPointer { wrapper: head.clone() })
}

pub fn match_scalar(_: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    match &ctx.ty.shape {
        TypeShape::Builtin(b) if b.builtin.is_scalar() => Some(FieldKind::Scalar { type_name: type_name(ctx.ty) }),
        _ => None,
    }
}

pub fn match_anonymous(_: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    ctx.field.anonymous.then_some(FieldKind::SkippedAnonymous)
}

pub fn match_enum(_: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    match &ctx.ty.shape {
        TypeShape::Enum(e) => Some(FieldKind::SkippedEnum { enum_name: e.decl.clone() }),
        _ => None,
    }
}

pub fn match_registered_record(_: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    let TypeShape::Record(record) = &ctx.ty.shape else {
        return None;
    };
    ctx.registry.lookup(&record.decl).map(|entry| FieldKind::NestedRecord {
        record: record.decl.clone(),
        symbol: entry.symbol.clone(),
    })
}

pub fn match_unregistered_record(_: &FieldClassifier, ctx: &ClassifyCtx<'_>) -> Option<FieldKind> {
    match &ctx.ty.shape {
        TypeShape::Record(record) => Some(FieldKind::DeferredUnresolved { record: record.decl.clone() }),
        _ => None,
    }
}

/// Two-dimensional field shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixShape {
    /// `T[R][C]`, `T**` and mixed forms
    #[serde(rename = "c-style-2d")]
    CStyle2D,
    /// A dynamic or bounded container of containers
    NestedVector,
    Eigen,
    #[serde(rename = "xtensor")]
    XTensor,
}

impl fmt::Display for MatrixShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatrixShape::CStyle2D => "C-style 2D",
            MatrixShape::NestedVector => "nested container",
            MatrixShape::Eigen => "Eigen",
            MatrixShape::XTensor => "xtensor",
        })
    }
}

const EIGEN_PREFIXES: &[&str] = &["Eigen::Matrix", "Eigen::Array"];
const XTENSOR_TEMPLATES: &[&str] = &["xt::xtensor", "xt::xarray", "xt::xtensor_fixed"];

/// Recognise two-dimensional shapes. Not part of [`MATCHERS`].
pub fn detect_matrix(classifier: &FieldClassifier, field: &FieldDescriptor) -> Option<MatrixShape> {
    let ty = &field.ty;
    let indirection = |t: &TypeDescriptor| -> Option<TypeDescriptor> {
        match &t.shape {
            TypeShape::Array(a) => Some((*a.element).clone()),
            TypeShape::Pointer(p) => Some((*p.pointee).clone()),
            _ => None,
        }
    };
    if let Some(inner) = indirection(ty) {
        let char_pointer = matches!(
            (&ty.shape, &inner.shape),
            (TypeShape::Array(_), TypeShape::Pointer(p))
                if matches!(&p.pointee.shape, TypeShape::Builtin(b) if classifier.config.char_types.contains(&b.builtin))
        );
        if indirection(&inner).is_some() && !char_pointer {
            return Some(MatrixShape::CStyle2D);
        }
    }

    let bare = ty.bare_spelling();
    let head = ty.template_head();
    if EIGEN_PREFIXES.iter().any(|prefix| strip_global(&bare).starts_with(prefix)) {
        return Some(MatrixShape::Eigen);
    }
    if let Some(head) = &head {
        if XTENSOR_TEMPLATES.iter().any(|name| strip_global(head) == *name) {
            return Some(MatrixShape::XTensor);
        }
        if classifier.is_vector_template(head) || classifier.is_fixed_array_template(head) {
            let args = field.template_arguments();
            if args.first().is_some_and(|element| classifier.is_container_spelling(element)) {
                return Some(MatrixShape::NestedVector);
            }
        }
    }
    None
}
