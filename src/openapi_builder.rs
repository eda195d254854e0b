use crate::document::{Mapping, Node};
use crate::error::{Error, Result};
use crate::operation::OperationSynthesizer;
use crate::path_template;
use crate::references::{ComponentRegistry, ReferenceResolver};
use crate::route::{Route, RouteCollection};
use crate::universe::TypeUniverse;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.2";

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// OpenAPI Contact object
#[derive(Debug, Clone, Default, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// OpenAPI License object
#[derive(Debug, Clone, Serialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, Serialize)]
pub struct Server {
    /// Server URL, may contain `{variable}` placeholders
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
}

/// Substitution value of a server URL placeholder
#[derive(Debug, Clone, Serialize)]
pub struct ServerVariable {
    pub default: String,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Security schemes, by name, with the scopes each requires
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SecurityRequirement(pub IndexMap<String, Vec<String>>);

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// `apiKey`, `http`, `oauth2` or `openIdConnect`
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the header, query or cookie parameter of an `apiKey` scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// HTTP authorization scheme of an `http` scheme, e.g. `bearer`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            variables: IndexMap::new(),
        }
    }
}

impl SecurityRequirement {
    /// Requires `scheme` with the given scopes.
    pub fn new(scheme: impl Into<String>, scopes: Vec<String>) -> Self {
        let mut requirement = IndexMap::new();
        requirement.insert(scheme.into(), scopes);
        Self(requirement)
    }
}

impl SecurityScheme {
    fn with_type(scheme_type: &str) -> Self {
        Self {
            scheme_type: scheme_type.to_string(),
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
        }
    }

    /// An `http` scheme such as `basic` or `bearer`.
    pub fn http(scheme: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            ..Self::with_type("http")
        }
    }

    /// An `apiKey` scheme reading parameter `name` from `location` (`header`, `query` or `cookie`).
    pub fn api_key(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location.into()),
            ..Self::with_type("apiKey")
        }
    }
}

/// What happens when two routes describe the same path and method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Fail with [`Error::DuplicateOperation`]
    #[default]
    Reject,
    /// Merge the later route's operation over the earlier one
    Overwrite,
}

/// OpenAPI document assembler
///
/// Routes are queued with [`add_route`](Self::add_route) and merged into the document by
/// [`generate_documentation`](Self::generate_documentation). Servers, security requirements
/// and security schemes are written into the document as soon as they are pushed.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::instance::Constructors;
/// use openapi_from_annotations::loader::RouteLoader;
/// use openapi_from_annotations::openapi_builder::{Info, OpenApi, Server};
///
/// let mut loader = RouteLoader::new(Constructors::unbound());
/// let routes = loader.load("./src/handlers").unwrap();
///
/// let mut openapi = OpenApi::new(Info::new("Users", "1.0.0")).unwrap();
/// openapi.add_routes(&routes);
/// openapi.generate_documentation(loader.universe()).unwrap();
/// openapi.push_server(Server::new("https://api.example.com")).unwrap();
/// println!("{}", openapi.to_yaml().unwrap());
/// ```
pub struct OpenApi {
    document: Node,
    routes: Vec<Route>,
    policy: MergePolicy,
    /// Name of the route each `(path, method)` was taken from
    owners: HashMap<(String, String), String>,
}

impl OpenApi {
    pub fn new(info: Info) -> Result<Self> {
        let mut document = Mapping::new();
        document.insert("openapi".to_string(), Node::from(OPENAPI_VERSION));
        document.insert("info".to_string(), Node::from_serializable(&info)?);
        debug!("Initializing OpenAPI {} document", OPENAPI_VERSION);

        Ok(Self {
            document: Node::Mapping(document),
            routes: Vec::new(),
            policy: MergePolicy::default(),
            owners: HashMap::new(),
        })
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Queues a route for the next [`generate_documentation`](Self::generate_documentation).
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn add_routes(&mut self, routes: &RouteCollection) {
        self.routes.extend(routes.iter().cloned());
    }

    /// Appends a server to `servers`.
    pub fn push_server(&mut self, server: Server) -> Result<()> {
        let server = Node::from_serializable(&server)?;
        self.document.sequence_entry("servers").push(server);
        Ok(())
    }

    /// Appends a requirement to `security`.
    pub fn push_security_requirement(&mut self, requirement: SecurityRequirement) -> Result<()> {
        let requirement = Node::from_serializable(&requirement)?;
        self.document.sequence_entry("security").push(requirement);
        Ok(())
    }

    /// Sets `components.securitySchemes.<name>`.
    pub fn push_security_scheme(&mut self, name: impl Into<String>, scheme: SecurityScheme) -> Result<()> {
        let scheme = Node::from_serializable(&scheme)?;
        self.document
            .mapping_entry("components")
            .entry("securitySchemes".to_string())
            .or_insert_with(Node::mapping)
            .ensure_mapping()
            .insert(name.into(), scheme);
        Ok(())
    }

    /// Merges the queued routes into `paths` and resolves every reference placeholder.
    ///
    /// Each declared method of a route becomes an operation at
    /// `paths.<plain path>.<lower-case method>`: its `operationId` is the route name, and the
    /// fields synthesized from the handler type are merged over it.
    ///
    /// On error the document is left as it was and the routes stay queued.
    pub fn generate_documentation(&mut self, universe: &TypeUniverse) -> Result<()> {
        let synthesizer = OperationSynthesizer::new(universe);
        info!("Generating documentation for {} routes", self.routes.len());

        let mut draft = Draft {
            document: self.document.clone(),
            owners: self.owners.clone(),
            policy: self.policy,
        };
        for route in &self.routes {
            let path = path_template::plain(route.path())?;
            let operation = synthesizer.synthesize(route)?;

            let mut methods: Vec<String> = Vec::with_capacity(route.methods().len());
            for method in route.methods() {
                let method = method.to_lowercase();
                if !methods.contains(&method) {
                    methods.push(method);
                }
            }
            for method in methods {
                draft.merge_operation(&path, &method, route.name(), &operation)?;
            }
        }

        let mut registry = ComponentRegistry::from_document(&draft.document);
        ReferenceResolver::new(universe).resolve(&mut draft.document, &mut registry)?;
        debug!("Document holds {} components", registry.len());

        self.document = draft.document;
        self.owners = draft.owners;
        self.routes.clear();
        Ok(())
    }

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.document)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }
}

/// Document and ownership state built by one generation pass
struct Draft {
    document: Node,
    owners: HashMap<(String, String), String>,
    policy: MergePolicy,
}

impl Draft {
    fn merge_operation(&mut self, path: &str, method: &str, route_name: &str, operation: &Mapping) -> Result<()> {
        let owner_key = (path.to_string(), method.to_string());
        if let Some(first) = self.owners.get(&owner_key) {
            match self.policy {
                MergePolicy::Reject => {
                    return Err(Error::DuplicateOperation {
                        path: path.to_string(),
                        method: method.to_uppercase(),
                        first: first.clone(),
                        second: route_name.to_string(),
                    })
                }
                MergePolicy::Overwrite => warn!(
                    "Route `{}` overwrites `{}` at {} {}",
                    route_name,
                    first,
                    method.to_uppercase(),
                    path
                ),
            }
        }
        self.owners.insert(owner_key, route_name.to_string());

        debug!("Adding operation: {} {}", method.to_uppercase(), path);
        let target = self
            .document
            .mapping_entry("paths")
            .entry(path.to_string())
            .or_insert_with(Node::mapping)
            .mapping_entry(method);
        target.insert("operationId".to_string(), Node::from(route_name));
        for (key, value) in operation {
            target.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
