//! JSON interchange format produced by the front end.
//!
//! Deserialization goes through a raw, name-based layer that mirrors the JSON,
//! then names are resolved into the id-indexed [`Program`] and each method
//! body becomes an [`FnAnalysis`].

use std::collections::{HashMap, HashSet};

use rowan::TextRange;
use serde::Deserialize;

use crate::analysis::{
    AnalysisResults, BasicBlock, BlockId, FnAnalysis, MethodIr, Statement, Terminator, Variable,
};
use crate::program::{
    Body, Entity, EntityKind, Field, FnSignature, Method, MethodId, Name, Program, Type,
    TypeParamId,
};

/// Error while loading an interchange document.
#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("malformed program: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entity `{0}` is defined more than once")]
    DuplicateEntity(String),
    #[error("`{entity}` declares `{member}` more than once")]
    DuplicateMember { entity: String, member: String },
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),
    #[error("unknown type parameter `{0}`")]
    UnknownTypeParameter(String),
    #[error("`{name}` expects {expected} type argument(s), found {found}")]
    WrongTypeArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid span {start}..{end}")]
    InvalidSpan { start: u32, end: u32 },
    #[error("method `{0}` has a body without blocks")]
    EmptyBody(String),
    #[error("method `{method}` refers to unknown block {block}")]
    UnknownBlock { method: String, block: u32 },
}

/// Parse and resolve an interchange document.
#[tracing::instrument(level = "debug", skip_all)]
pub fn load_program(json: &str) -> Result<(Program, AnalysisResults), InterchangeError> {
    let raw: RawProgram = serde_json::from_str(json)?;
    let loader = Loader {
        program: Program::new(raw.source),
        analysis: AnalysisResults::new(),
    };
    let (program, analysis) = loader.load(raw.entities)?;
    tracing::debug!(
        entities = program.entities().count(),
        bodies = analysis.functions.len(),
        "program loaded"
    );
    Ok((program, analysis))
}

#[derive(Debug, Deserialize)]
struct RawProgram {
    #[serde(default)]
    source: Option<String>,
    entities: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: String,
    #[serde(default)]
    span: Option<[u32; 2]>,
    #[serde(default)]
    kind: RawEntityKind,
    #[serde(default)]
    generics: Vec<String>,
    #[serde(default)]
    supertypes: Vec<RawType>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    methods: Vec<RawMethod>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawEntityKind {
    #[default]
    Class,
    Interface,
    Primitive,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    span: Option<[u32; 2]>,
    #[serde(rename = "type")]
    ty: RawType,
}

#[derive(Debug, Deserialize)]
struct RawMethod {
    name: String,
    #[serde(default)]
    span: Option<[u32; 2]>,
    #[serde(default)]
    generics: Vec<String>,
    #[serde(default)]
    receiver: Option<RawType>,
    #[serde(default)]
    arguments: Vec<RawType>,
    #[serde(default, rename = "return")]
    return_type: RawType,
    #[serde(default)]
    body: Option<RawBody>,
}

/// `"unit"`, `{"entity": {"name": "Box", "args": [...]}}` or `{"param": "T"}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawType {
    #[default]
    Unit,
    Entity {
        name: String,
        #[serde(default)]
        args: Vec<RawType>,
    },
    Param(String),
}

#[derive(Debug, Deserialize)]
struct RawBody {
    #[serde(default)]
    span: Option<[u32; 2]>,
    #[serde(default)]
    parameters: Vec<u32>,
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    statements: Vec<RawStatement>,
    terminator: RawTerminator,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum RawStatement {
    Integer {
        output: u32,
        value: u64,
    },
    String {
        output: u32,
        value: String,
    },
    Unit {
        output: u32,
    },
    Copy {
        output: u32,
        input: u32,
    },
    New {
        output: u32,
        class: RawType,
    },
    Call {
        output: u32,
        receiver: u32,
        method: String,
        #[serde(default)]
        type_arguments: Vec<RawType>,
        #[serde(default)]
        arguments: Vec<u32>,
    },
    StaticCall {
        output: u32,
        entity: RawType,
        method: String,
        #[serde(default)]
        type_arguments: Vec<RawType>,
        #[serde(default)]
        arguments: Vec<u32>,
    },
    ReadField {
        output: u32,
        base: u32,
        field: String,
    },
    WriteField {
        output: u32,
        base: u32,
        field: String,
        input: u32,
    },
    TypeTest {
        output: u32,
        input: u32,
        #[serde(rename = "type")]
        ty: RawType,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawTerminator {
    Return(Option<u32>),
    Jump(u32),
    Branch {
        condition: u32,
        if_true: u32,
        if_false: u32,
    },
}

/// Type parameters in scope, by name.
type Scope = HashMap<String, TypeParamId>;

struct Loader {
    program: Program,
    analysis: AnalysisResults,
}

impl Loader {
    fn load(
        mut self,
        entities: Vec<RawEntity>,
    ) -> Result<(Program, AnalysisResults), InterchangeError> {
        // Declare every entity first so member types can refer to any of them.
        let mut declared = Vec::with_capacity(entities.len());
        for raw in &entities {
            let name = self.name(&raw.name, raw.span)?;
            let generics = self.type_params(&raw.generics);
            let entity = Entity {
                name,
                kind: raw.kind.into(),
                generics,
                supertypes: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
            };
            let id = self
                .program
                .add_entity(entity)
                .ok_or_else(|| InterchangeError::DuplicateEntity(raw.name.clone()))?;
            declared.push(id);
        }

        for (id, raw) in declared.into_iter().zip(entities) {
            let scope: Scope = raw
                .generics
                .iter()
                .cloned()
                .zip(self.program.entity(id).generics.iter().copied())
                .collect();

            let supertypes = raw
                .supertypes
                .iter()
                .map(|ty| self.resolve_type(ty, &scope))
                .collect::<Result<Vec<_>, _>>()?;

            let mut seen = HashSet::new();
            let mut fields = Vec::with_capacity(raw.fields.len());
            for field in &raw.fields {
                check_unique(&mut seen, &raw.name, &field.name)?;
                fields.push(Field {
                    name: self.name(&field.name, field.span)?,
                    ty: self.resolve_type(&field.ty, &scope)?,
                });
            }

            let mut methods = Vec::with_capacity(raw.methods.len());
            let mut seen = HashSet::new();
            for (index, method) in raw.methods.iter().enumerate() {
                check_unique(&mut seen, &raw.name, &method.name)?;
                let id = MethodId {
                    entity: id,
                    index: index as u32,
                };
                methods.push(self.method(id, method, &scope)?);
            }

            let entity = self.program.entity_mut(id);
            entity.supertypes = supertypes;
            entity.fields = fields;
            entity.methods = methods;
        }

        Ok((self.program, self.analysis))
    }

    fn method(
        &mut self,
        id: MethodId,
        raw: &RawMethod,
        entity_scope: &Scope,
    ) -> Result<Method, InterchangeError> {
        let name = self.name(&raw.name, raw.span)?;
        let generics = self.type_params(&raw.generics);

        let mut scope = entity_scope.clone();
        scope.extend(raw.generics.iter().cloned().zip(generics.iter().copied()));

        let signature = FnSignature {
            generics,
            receiver: raw
                .receiver
                .as_ref()
                .map(|ty| self.resolve_type(ty, &scope))
                .transpose()?,
            arguments: raw
                .arguments
                .iter()
                .map(|ty| self.resolve_type(ty, &scope))
                .collect::<Result<_, _>>()?,
            return_type: self.resolve_type(&raw.return_type, &scope)?,
        };

        let body = match &raw.body {
            None => None,
            Some(body) => {
                let ir = self.body(&raw.name, body, &scope)?;
                self.analysis.insert(id, FnAnalysis::new(ir));
                Some(Body {
                    range: body.span.map(span_range).transpose()?,
                })
            }
        };

        Ok(Method {
            name,
            signature,
            body,
        })
    }

    fn body(
        &mut self,
        method: &str,
        raw: &RawBody,
        scope: &Scope,
    ) -> Result<MethodIr, InterchangeError> {
        if raw.blocks.is_empty() {
            return Err(InterchangeError::EmptyBody(method.to_string()));
        }

        let mut blocks = Vec::with_capacity(raw.blocks.len());
        for block in &raw.blocks {
            let statements = block
                .statements
                .iter()
                .map(|stmt| self.statement(stmt, scope))
                .collect::<Result<_, _>>()?;
            let terminator = terminator(&block.terminator);

            if let Some(target) = terminator
                .successors()
                .into_iter()
                .find(|b| b.0 as usize >= raw.blocks.len())
            {
                return Err(InterchangeError::UnknownBlock {
                    method: method.to_string(),
                    block: target.0,
                });
            }

            blocks.push(BasicBlock {
                statements,
                terminator,
            });
        }

        Ok(MethodIr {
            parameters: raw.parameters.iter().copied().map(Variable).collect(),
            blocks,
        })
    }

    fn statement(
        &mut self,
        raw: &RawStatement,
        scope: &Scope,
    ) -> Result<Statement, InterchangeError> {
        Ok(match raw {
            RawStatement::Integer { output, value } => Statement::Integer {
                output: Variable(*output),
                value: *value,
            },
            RawStatement::String { output, value } => Statement::String {
                output: Variable(*output),
                value: value.clone(),
            },
            RawStatement::Unit { output } => Statement::Unit {
                output: Variable(*output),
            },
            RawStatement::Copy { output, input } => Statement::Copy {
                output: Variable(*output),
                input: Variable(*input),
            },
            RawStatement::New { output, class } => Statement::New {
                output: Variable(*output),
                class: self.resolve_type(class, scope)?,
            },
            RawStatement::Call {
                output,
                receiver,
                method,
                type_arguments,
                arguments,
            } => Statement::Call {
                output: Variable(*output),
                receiver: Variable(*receiver),
                method: self.program.intern(method),
                type_arguments: self.resolve_types(type_arguments, scope)?,
                arguments: arguments.iter().copied().map(Variable).collect(),
            },
            RawStatement::StaticCall {
                output,
                entity,
                method,
                type_arguments,
                arguments,
            } => Statement::StaticCall {
                output: Variable(*output),
                entity: self.resolve_type(entity, scope)?,
                method: self.program.intern(method),
                type_arguments: self.resolve_types(type_arguments, scope)?,
                arguments: arguments.iter().copied().map(Variable).collect(),
            },
            RawStatement::ReadField {
                output,
                base,
                field,
            } => Statement::ReadField {
                output: Variable(*output),
                base: Variable(*base),
                field: self.program.intern(field),
            },
            RawStatement::WriteField {
                output,
                base,
                field,
                input,
            } => Statement::WriteField {
                output: Variable(*output),
                base: Variable(*base),
                field: self.program.intern(field),
                input: Variable(*input),
            },
            RawStatement::TypeTest { output, input, ty } => Statement::TypeTest {
                output: Variable(*output),
                input: Variable(*input),
                ty: self.resolve_type(ty, scope)?,
            },
        })
    }

    fn resolve_type(&self, raw: &RawType, scope: &Scope) -> Result<Type, InterchangeError> {
        match raw {
            RawType::Unit => Ok(Type::Unit),
            RawType::Param(name) => scope
                .get(name)
                .map(|&p| Type::Param(p))
                .ok_or_else(|| InterchangeError::UnknownTypeParameter(name.clone())),
            RawType::Entity { name, args } => {
                let id = self
                    .program
                    .find_entity(name)
                    .ok_or_else(|| InterchangeError::UnknownEntity(name.clone()))?;
                let expected = self.program.entity(id).generics.len();
                if args.len() != expected {
                    return Err(InterchangeError::WrongTypeArgumentCount {
                        name: name.clone(),
                        expected,
                        found: args.len(),
                    });
                }
                Ok(Type::entity(id, self.resolve_types(args, scope)?))
            }
        }
    }

    fn resolve_types(&self, raw: &[RawType], scope: &Scope) -> Result<Vec<Type>, InterchangeError> {
        raw.iter().map(|ty| self.resolve_type(ty, scope)).collect()
    }

    fn type_params(&mut self, names: &[String]) -> Vec<TypeParamId> {
        names
            .iter()
            .map(|n| {
                let sym = self.program.intern(n);
                self.program.add_type_param(sym)
            })
            .collect()
    }

    fn name(&mut self, name: &str, span: Option<[u32; 2]>) -> Result<Name, InterchangeError> {
        Ok(Name {
            symbol: self.program.intern(name),
            range: span.map(span_range).transpose()?,
        })
    }
}

/// Record `member` in `seen`, failing on the second occurrence.
fn check_unique<'a>(
    seen: &mut HashSet<&'a str>,
    entity: &str,
    member: &'a str,
) -> Result<(), InterchangeError> {
    if !seen.insert(member) {
        return Err(InterchangeError::DuplicateMember {
            entity: entity.to_string(),
            member: member.to_string(),
        });
    }
    Ok(())
}

fn span_range([start, end]: [u32; 2]) -> Result<TextRange, InterchangeError> {
    if start > end {
        return Err(InterchangeError::InvalidSpan { start, end });
    }
    Ok(TextRange::new(start.into(), end.into()))
}

fn terminator(raw: &RawTerminator) -> Terminator {
    match raw {
        RawTerminator::Return(value) => Terminator::Return(value.map(Variable)),
        RawTerminator::Jump(target) => Terminator::Jump(BlockId(*target)),
        RawTerminator::Branch {
            condition,
            if_true,
            if_false,
        } => Terminator::Branch {
            condition: Variable(*condition),
            if_true: BlockId(*if_true),
            if_false: BlockId(*if_false),
        },
    }
}

impl From<RawEntityKind> for EntityKind {
    fn from(raw: RawEntityKind) -> Self {
        match raw {
            RawEntityKind::Class => Self::Class,
            RawEntityKind::Interface => Self::Interface,
            RawEntityKind::Primitive => Self::Primitive,
        }
    }
}
