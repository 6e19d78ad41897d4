//! `create`, `update` and `delete` mutations of a class.

use async_graphql::dynamic::TypeRef;
use strata_storage::ClassSchema;
use tracing::trace;

use super::build::SchemaBuild;
use super::loader::ClassLoader;
use super::model::{FieldDef, InputValueDef, resolver};
use crate::config::ClassConfig;
use crate::error::GraphQLError;
use crate::registry::AddOptions;
use crate::resolvers::{CreateResolver, DeleteResolver, UpdateResolver};

pub struct ClassMutationLoader;

impl ClassLoader for ClassMutationLoader {
    fn name(&self) -> &'static str {
        "mutation"
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
        let graphql_name = types.graphql_name;
        let config = class_config.and_then(|c| c.mutation.clone()).unwrap_or_default();
        let class_name = class.class_name.clone();

        if config.create != Some(false) {
            let name = config
                .create_alias
                .unwrap_or_else(|| format!("create{graphql_name}"));
            let mut field = FieldDef::new(&name, TypeRef::named_nn(&output)).description(format!(
                "The {name} mutation can be used to create a new object of the {class_name} class."
            ));
            if let Some(input) = &types.create_input {
                field = field.argument(InputValueDef::new("fields", TypeRef::named(input)));
            }
            let field = field.resolve_with(resolver(CreateResolver::resolve(class_name.clone())));
            build.add_graphql_mutation(name, field, AddOptions::default())?;
        }

        if config.update != Some(false) {
            let name = config
                .update_alias
                .unwrap_or_else(|| format!("update{graphql_name}"));
            let mut field = FieldDef::new(&name, TypeRef::named_nn(&output))
                .description(format!(
                    "The {name} mutation can be used to update an object of the {class_name} class."
                ))
                .argument(InputValueDef::new("id", TypeRef::named_nn(TypeRef::ID)));
            if let Some(input) = &types.update_input {
                field = field.argument(InputValueDef::new("fields", TypeRef::named(input)));
            }
            let field = field.resolve_with(resolver(UpdateResolver::resolve(class_name.clone())));
            build.add_graphql_mutation(name, field, AddOptions::default())?;
        }

        if config.destroy != Some(false) {
            let name = config
                .destroy_alias
                .unwrap_or_else(|| format!("delete{graphql_name}"));
            let field = FieldDef::new(&name, TypeRef::named_nn(&output))
                .description(format!(
                    "The {name} mutation can be used to delete an object of the {class_name} class."
                ))
                .argument(InputValueDef::new("id", TypeRef::named_nn(TypeRef::ID)))
                .resolve_with(resolver(DeleteResolver::resolve(class_name.clone())));
            build.add_graphql_mutation(name, field, AddOptions::default())?;
        }

        trace!(class_name = %class_name, "Loaded class mutations");
        Ok(())
    }
}
