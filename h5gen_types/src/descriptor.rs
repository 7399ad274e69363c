use crate::tokens::template_arguments_from_code;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinKind {
    Bool,
    Char,
    Schar,
    Uchar,
    Wchar,
    Char8,
    Char16,
    Char32,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    LongLong,
    UlongLong,
    Int128,
    Uint128,
    Float,
    Double,
    LongDouble,
    Void,
    Nullptr,
}

impl BuiltinKind {
    /// Numeric and boolean kinds, `bool` through `long double`.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, BuiltinKind::Void | BuiltinKind::Nullptr)
    }

    pub fn cpp_spelling(&self) -> &'static str {
        match self {
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::Schar => "signed char",
            BuiltinKind::Uchar => "unsigned char",
            BuiltinKind::Wchar => "wchar_t",
            BuiltinKind::Char8 => "char8_t",
            BuiltinKind::Char16 => "char16_t",
            BuiltinKind::Char32 => "char32_t",
            BuiltinKind::Short => "short",
            BuiltinKind::Ushort => "unsigned short",
            BuiltinKind::Int => "int",
            BuiltinKind::Uint => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::Ulong => "unsigned long",
            BuiltinKind::LongLong => "long long",
            BuiltinKind::UlongLong => "unsigned long long",
            BuiltinKind::Int128 => "__int128",
            BuiltinKind::Uint128 => "unsigned __int128",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
            BuiltinKind::LongDouble => "long double",
            BuiltinKind::Void => "void",
            BuiltinKind::Nullptr => "std::nullptr_t",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AccessSpecifier {
    #[default]
    Public,
    Protected,
    Private,
}

/// How the element count of an array type is known.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum ArraySizeKind {
    /// `int a[3]`
    Constant,
    /// `int a[]`, length supplied elsewhere in the header
    Incomplete,
    /// `int a[n]`
    Variable,
    /// `int a[N + f()]` inside a template
    DependentSized,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct BuiltinType {
    pub builtin: BuiltinKind,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct PointerType {
    pub pointee: Box<TypeDescriptor>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ArrayType {
    pub size_kind: ArraySizeKind,
    #[serde(default)]
    pub count: Option<u64>,
    /// Symbolic length such as a macro or constexpr name
    #[serde(default)]
    pub count_expr: Option<String>,
    pub element: Box<TypeDescriptor>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RecordRef {
    /// Qualified name of the referenced record declaration
    pub decl: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumRef {
    pub decl: String,
    #[serde(default)]
    pub scoped: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateType {
    /// Qualified template name, e.g. `std::vector`
    pub template: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeShape {
    Builtin(BuiltinType),
    Pointer(PointerType),
    Array(ArrayType),
    Record(RecordRef),
    Enum(EnumRef),
    Template(TemplateType),
    Unexposed,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypeDescriptor {
    pub spelling: String,
    #[serde(flatten)]
    pub shape: TypeShape,
}

impl TypeDescriptor {
    pub fn builtin(spelling: impl Into<String>, builtin: BuiltinKind) -> Self {
        Self { spelling: spelling.into(), shape: TypeShape::Builtin(BuiltinType { builtin }) }
    }

    pub fn pointer_to(pointee: TypeDescriptor) -> Self {
        Self {
            spelling: format!("{} *", pointee.spelling),
            shape: TypeShape::Pointer(PointerType { pointee: Box::new(pointee) }),
        }
    }

    pub fn constant_array(element: TypeDescriptor, count: u64) -> Self {
        Self {
            spelling: format!("{} [{}]", element.spelling, count),
            shape: TypeShape::Array(ArrayType {
                size_kind: ArraySizeKind::Constant,
                count: Some(count),
                count_expr: None,
                element: Box::new(element),
            }),
        }
    }

    pub fn record(spelling: impl Into<String>, decl: impl Into<String>) -> Self {
        Self { spelling: spelling.into(), shape: TypeShape::Record(RecordRef { decl: decl.into() }) }
    }

    pub fn enumeration(spelling: impl Into<String>, decl: impl Into<String>, scoped: bool) -> Self {
        Self { spelling: spelling.into(), shape: TypeShape::Enum(EnumRef { decl: decl.into(), scoped }) }
    }

    pub fn template(spelling: impl Into<String>, template: impl Into<String>, args: &[&str]) -> Self {
        Self {
            spelling: spelling.into(),
            shape: TypeShape::Template(TemplateType {
                template: template.into(),
                args: args.iter().map(|a| a.to_string()).collect(),
            }),
        }
    }

    pub fn unexposed(spelling: impl Into<String>) -> Self {
        Self { spelling: spelling.into(), shape: TypeShape::Unexposed }
    }

    /// Number of pointer levels before reaching a non-pointer type.
    pub fn pointer_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let TypeShape::Pointer(ptr) = &current.shape {
            depth += 1;
            current = &ptr.pointee;
        }
        depth
    }

    /// Spelling with cv-qualifiers and reference markers removed.
    pub fn bare_spelling(&self) -> String {
        bare_type_spelling(&self.spelling)
    }

    /// Template name for template instantiations, falling back to the text
    /// before `<` in the spelling for provider output that leaves the type unexposed.
    pub fn template_head(&self) -> Option<String> {
        match &self.shape {
            TypeShape::Template(t) => Some(bare_type_spelling(&t.template)),
            TypeShape::Pointer(_) | TypeShape::Array(_) | TypeShape::Builtin(_) => None,
            _ => {
                let bare = self.bare_spelling();
                bare.find('<').map(|pos| bare[..pos].trim().to_string())
            }
        }
    }

    /// Template arguments known from the structure or from the spelling,
    /// whichever lists more. Introspectors often drop non-type arguments.
    pub fn template_arguments(&self) -> Vec<String> {
        let structural: Vec<String> = match &self.shape {
            TypeShape::Template(t) => t.args.iter().map(|a| a.trim().to_string()).collect(),
            _ => Vec::new(),
        };
        longer_argument_list(structural, &self.spelling)
    }
}

fn longer_argument_list(known: Vec<String>, code: &str) -> Vec<String> {
    if !code.contains('<') {
        return known;
    }
    let recovered = template_arguments_from_code(code);
    if recovered.len() > known.len() { recovered } else { known }
}

/// Strip `const`/`volatile` qualifiers, references and redundant whitespace.
pub fn bare_type_spelling(spelling: &str) -> String {
    let words: Vec<&str> = spelling
        .split_whitespace()
        .filter(|w| !matches!(*w, "const" | "volatile" | "struct" | "class"))
        .collect();
    words.join(" ").trim_end_matches('&').trim().to_string()
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Raw token text of the declaration, e.g. `std::vector<int> values`
    #[serde(default)]
    pub tokens: String,
    #[serde(default)]
    pub access: AccessSpecifier,
    #[serde(default)]
    pub anonymous: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        let tokens = format!("{} {}", ty.spelling, name);
        Self { name, ty, tokens, access: AccessSpecifier::Public, anonymous: false }
    }

    pub fn is_public(&self) -> bool {
        self.access == AccessSpecifier::Public
    }

    /// Template arguments of the declared type. The token text is consulted when
    /// it lists more arguments than the structure or the spelling.
    pub fn template_arguments(&self) -> Vec<String> {
        longer_argument_list(self.ty.template_arguments(), &self.tokens)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RecordDescriptor {
    /// Name as spelled inside the enclosing namespace, e.g. `Outer::Inner`
    pub name: String,
    /// Fully qualified name, the identity used for nested-record lookups
    #[serde(default)]
    pub qualified_name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub is_template: bool,
    /// Declarations nested inside this record, visited after the record itself
    #[serde(default)]
    pub nested: Vec<Declaration>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>, qualified_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            fields,
            is_template: false,
            nested: Vec::new(),
        }
    }

    /// Qualified name, or the plain name when the provider left it out.
    pub fn identity(&self) -> &str {
        if self.qualified_name.is_empty() {
            &self.name
        } else {
            &self.qualified_name
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn public_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_public())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumVariant {
    pub name: String,
    #[serde(default)]
    pub value: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDescriptor {
    pub name: String,
    #[serde(default)]
    pub qualified_name: String,
    #[serde(default)]
    pub scoped: bool,
    #[serde(default)]
    pub variants: Vec<EnumVariant>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Declaration {
    Record(RecordDescriptor),
    Enum(EnumDescriptor),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Record(r) => &r.name,
            Declaration::Enum(e) => &e.name,
        }
    }
}

/// Everything the introspector reports for one input header.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DescriptorFile {
    /// Header the descriptors were extracted from
    pub source: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl DescriptorFile {
    /// Records in declaration order, each followed by the records nested in it.
    pub fn records(&self) -> Vec<&RecordDescriptor> {
        fn walk<'a>(decls: &'a [Declaration], out: &mut Vec<&'a RecordDescriptor>) {
            for decl in decls {
                if let Declaration::Record(record) = decl {
                    out.push(record);
                    walk(&record.nested, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.declarations, &mut out);
        out
    }
}
