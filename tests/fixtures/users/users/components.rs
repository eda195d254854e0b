#[component(responses, description = "The requested user", content = {
    "application/json" = { schema = { "$ref" = reference(schemas, User) } },
})]
pub struct UserFound;

#[component(requestBodies, required = true, content = {
    "application/json" = { schema = { "$ref" = reference(schemas, User) } },
})]
pub struct UserUpdate;

#[component(schemas, type = "object", required = ["id"], properties = {
    id = { type = "integer", format = "int64" },
    name = { type = "string", nullable = true },
    group = { "$ref" = reference(schemas, Group) },
})]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub group: Group,
}

#[component(schemas, type = "object", properties = {
    title = { type = "string" },
    owner = { "$ref" = reference(schemas, User) },
})]
pub struct Group {
    pub title: String,
    pub owner: Box<User>,
}
