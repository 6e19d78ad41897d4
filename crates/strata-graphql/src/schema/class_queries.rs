//! `get` and `find` queries of a class.

use async_graphql::dynamic::TypeRef;
use strata_storage::ClassSchema;
use tracing::trace;

use super::build::SchemaBuild;
use super::defaults::OBJECT_SCALAR;
use super::loader::ClassLoader;
use super::model::{FieldDef, InputValueDef, resolver};
use super::names::{lower_first, pluralize};
use crate::config::ClassConfig;
use crate::error::GraphQLError;
use crate::registry::AddOptions;
use crate::resolvers::{FindResolver, GetResolver};

/// Registers `<class>(id: ID!)` and `<classes>(where, order, skip, first)`.
///
/// Needs the output and connection types recorded by the type loader; a
/// class without them gets no queries.
pub struct ClassQueryLoader;

impl ClassLoader for ClassQueryLoader {
    fn name(&self) -> &'static str {
        "query"
    }

    fn load(
        &self,
        build: &mut SchemaBuild<'_>,
        class: &ClassSchema,
        class_config: Option<&ClassConfig>,
    ) -> Result<(), GraphQLError> {
        let Some(types) = build.class_types(&class.class_name).cloned() else {
            return Ok(());
        };
        let Some(output) = types.output else {
            return Ok(());
        };
        let query_config = class_config.and_then(|c| c.query.as_ref());

        if query_config.and_then(|q| q.get) != Some(false) {
            let name = query_config
                .and_then(|q| q.get_alias.clone())
                .unwrap_or_else(|| lower_first(&types.graphql_name));
            let field = FieldDef::new(&name, TypeRef::named(&output))
                .description(format!(
                    "The {name} query can be used to get an object of the {} class by its id.",
                    class.class_name
                ))
                .argument(InputValueDef::new("id", TypeRef::named_nn(TypeRef::ID)))
                .resolve_with(resolver(GetResolver::resolve(class.class_name.clone())));
            build.add_graphql_query(name, field, AddOptions::default())?;
        }

        if let Some(connection) = types.connection
            && query_config.and_then(|q| q.find) != Some(false)
        {
            let name = query_config
                .and_then(|q| q.find_alias.clone())
                .unwrap_or_else(|| lower_first(&pluralize(&types.graphql_name)));
            let mut field = FieldDef::new(&name, TypeRef::named_nn(connection))
                .description(format!(
                    "The {name} query can be used to find objects of the {} class.",
                    class.class_name
                ))
                .argument(InputValueDef::new("where", TypeRef::named(OBJECT_SCALAR)));
            if let Some(order) = &types.order {
                field = field.argument(InputValueDef::new("order", TypeRef::named_nn_list(order)));
            }
            let field = field
                .argument(InputValueDef::new("skip", TypeRef::named(TypeRef::INT)))
                .argument(InputValueDef::new("first", TypeRef::named(TypeRef::INT)))
                .resolve_with(resolver(FindResolver::resolve(class.class_name.clone())));
            build.add_graphql_query(name, field, AddOptions::default())?;
        }

        trace!(class_name = %class.class_name, "Loaded class queries");
        Ok(())
    }
}
