//! Delete policy for every foreign key of the schema.
//!
//! `MemoryStore` walks this table when removing rows; the SQL migration
//! declares the same rules on its foreign keys.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    User,
    Recipe,
    Tag,
    Ingredient,
}

impl Entity {
    pub fn table(&self) -> &'static str {
        match self {
            Entity::User => "users",
            Entity::Recipe => "recipes",
            Entity::Tag => "tags",
            Entity::Ingredient => "ingredients",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dependent {
    Recipe,
    IngredientAmount,
    RecipeTag,
    Favorite,
    ShoppingCartEntry,
    Follow,
}

impl Dependent {
    pub fn table(&self) -> &'static str {
        match self {
            Dependent::Recipe => "recipes",
            Dependent::IngredientAmount => "ingredient_amounts",
            Dependent::RecipeTag => "recipe_tags",
            Dependent::Favorite => "favorites",
            Dependent::ShoppingCartEntry => "shopping_cart",
            Dependent::Follow => "follows",
        }
    }

    /// The entity this dependent row also is, when other rows hang off it.
    pub fn as_parent(&self) -> Option<Entity> {
        match self {
            Dependent::Recipe => Some(Entity::Recipe),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    Restrict,
}

impl OnDelete {
    pub fn sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Relation {
    pub parent: Entity,
    pub dependent: Dependent,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

const fn relation(
    parent: Entity,
    dependent: Dependent,
    column: &'static str,
    on_delete: OnDelete,
) -> Relation {
    Relation {
        parent,
        dependent,
        column,
        on_delete,
    }
}

pub const RELATIONS: &[Relation] = &[
    relation(Entity::User, Dependent::Recipe, "author_id", OnDelete::Cascade),
    relation(Entity::User, Dependent::Favorite, "user_id", OnDelete::Cascade),
    relation(Entity::User, Dependent::ShoppingCartEntry, "user_id", OnDelete::Cascade),
    relation(Entity::User, Dependent::Follow, "follower_id", OnDelete::Cascade),
    relation(Entity::User, Dependent::Follow, "author_id", OnDelete::Cascade),
    relation(Entity::Recipe, Dependent::IngredientAmount, "recipe_id", OnDelete::Cascade),
    relation(Entity::Recipe, Dependent::RecipeTag, "recipe_id", OnDelete::Cascade),
    relation(Entity::Recipe, Dependent::Favorite, "recipe_id", OnDelete::Cascade),
    relation(Entity::Recipe, Dependent::ShoppingCartEntry, "recipe_id", OnDelete::Cascade),
    relation(Entity::Ingredient, Dependent::IngredientAmount, "ingredient_id", OnDelete::Restrict),
    relation(Entity::Tag, Dependent::RecipeTag, "tag_id", OnDelete::Restrict),
];

pub fn relations_of(parent: Entity) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.parent == parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

    #[test]
    fn migration_declares_every_relation() {
        for relation in RELATIONS {
            let declaration = format!(
                "{} INTEGER NOT NULL REFERENCES {} (id) ON DELETE {}",
                relation.column,
                relation.parent.table(),
                relation.on_delete.sql()
            );
            let table = MIGRATION
                .split("CREATE TABLE ")
                .find(|block| block.starts_with(&format!("{} (", relation.dependent.table())))
                .unwrap_or_else(|| panic!("missing table {}", relation.dependent.table()));
            assert!(
                table.contains(&declaration),
                "{} lacks `{declaration}`",
                relation.dependent.table()
            );
        }
    }

    #[test]
    fn author_removal_takes_recipes_along() {
        assert!(relations_of(Entity::User).any(|r| r.dependent == Dependent::Recipe
            && r.on_delete == OnDelete::Cascade));
    }

    #[test]
    fn catalog_rows_in_use_are_protected() {
        assert!(relations_of(Entity::Tag).all(|r| r.on_delete == OnDelete::Restrict));
        assert!(relations_of(Entity::Ingredient).all(|r| r.on_delete == OnDelete::Restrict));
    }
}
