//! Curated service catalogs.
//!
//! None of the providers expose a usable service inventory, so each one gets a
//! fixed list of categories and display names. Fetchers iterate these lists and
//! only annotate status; they never add or drop entries.

use crate::models::Provider;

pub type CategoryList = &'static [(&'static str, &'static [&'static str])];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCatalogEntry {
    pub category: &'static str,
    pub name: &'static str,
}

pub const AWS_CATALOG: CategoryList = &[
    (
        "Compute",
        &[
            "Amazon EC2",
            "AWS Lambda",
            "Amazon ECS",
            "Amazon EKS",
            "AWS Fargate",
            "Amazon Lightsail",
            "AWS Batch",
        ],
    ),
    (
        "Storage",
        &[
            "Amazon S3",
            "Amazon EBS",
            "Amazon EFS",
            "Amazon Glacier",
            "AWS Storage Gateway",
        ],
    ),
    (
        "Database",
        &[
            "Amazon RDS",
            "Amazon DynamoDB",
            "Amazon Aurora",
            "Amazon ElastiCache",
            "Amazon Redshift",
            "Amazon DocumentDB",
        ],
    ),
    (
        "Networking",
        &[
            "Amazon VPC",
            "Amazon CloudFront",
            "Amazon Route 53",
            "Elastic Load Balancing",
            "AWS Direct Connect",
            "Amazon API Gateway",
        ],
    ),
    (
        "Application Integration",
        &[
            "Amazon SQS",
            "Amazon SNS",
            "Amazon EventBridge",
            "AWS Step Functions",
        ],
    ),
    (
        "Security & Identity",
        &[
            "AWS IAM",
            "AWS KMS",
            "Amazon Cognito",
            "AWS WAF",
            "AWS Shield",
            "AWS Secrets Manager",
        ],
    ),
    (
        "Management & Monitoring",
        &[
            "Amazon CloudWatch",
            "AWS CloudFormation",
            "AWS CloudTrail",
            "AWS Systems Manager",
            "AWS Config",
        ],
    ),
    (
        "AI & Machine Learning",
        &[
            "Amazon SageMaker",
            "Amazon Bedrock",
            "Amazon Rekognition",
            "Amazon Comprehend",
            "Amazon Polly",
            "Amazon Transcribe",
        ],
    ),
    (
        "Developer Tools",
        &[
            "AWS CodePipeline",
            "AWS CodeBuild",
            "AWS CodeDeploy",
            "AWS CodeCommit",
        ],
    ),
    (
        "Analytics",
        &[
            "Amazon Kinesis",
            "Amazon Athena",
            "AWS Glue",
            "Amazon EMR",
            "Amazon OpenSearch Service",
        ],
    ),
];

pub const AZURE_CATALOG: CategoryList = &[
    (
        "Compute",
        &[
            "Virtual Machines",
            "Virtual Machine Scale Sets",
            "App Service",
            "App Service (Linux)",
            "Azure Functions",
            "Azure Kubernetes Service (AKS)",
            "Container Instances",
            "Batch",
            "Cloud Services",
            "Azure Spring Apps",
        ],
    ),
    (
        "Storage",
        &[
            "Storage Accounts",
            "Azure Backup",
            "Azure Site Recovery",
            "StorSimple",
            "Azure NetApp Files",
            "Azure HPC Cache",
            "Azure Managed Lustre",
        ],
    ),
    (
        "Database",
        &[
            "Azure Cosmos DB",
            "Azure SQL Database",
            "Azure Database for MySQL",
            "Azure Database for PostgreSQL",
            "Azure Database for MariaDB",
            "Azure Cache for Redis",
            "Azure SQL Managed Instance",
        ],
    ),
    (
        "Networking",
        &[
            "Virtual Network",
            "Load Balancer",
            "VPN Gateway",
            "Application Gateway",
            "Azure Firewall",
            "Azure DDoS Protection",
            "Network Infrastructure",
            "ExpressRoute Circuits",
            "Azure Private Link",
            "Azure Front Door",
            "Virtual WAN",
            "Network Watcher",
            "Web Application Firewall",
        ],
    ),
    (
        "AI & Machine Learning",
        &[
            "Azure Machine Learning",
            "Cognitive Services",
            "Azure AI services",
            "Azure AI Search",
            "Azure AI Language",
            "Azure AI Vision",
            "Azure AI Speech",
            "Azure AI Translator",
            "Azure OpenAI",
        ],
    ),
    (
        "Integration & Messaging",
        &[
            "Service Bus",
            "Event Grid",
            "Event Hubs",
            "API Management",
            "Logic Apps",
            "Notification Hubs",
            "Azure SignalR Service",
        ],
    ),
    (
        "Identity & Security",
        &[
            "Azure Active Directory",
            "Key Vault",
            "Azure Sentinel",
            "Microsoft Defender for Cloud",
            "Azure DDoS Protection",
        ],
    ),
    (
        "Management & Monitoring",
        &[
            "Azure Monitor",
            "Log Analytics",
            "Azure Resource Manager",
            "Automation",
            "Azure Policy",
            "Azure Advisor",
        ],
    ),
    (
        "Analytics",
        &[
            "Azure Synapse Analytics",
            "HDInsight",
            "Azure Databricks",
            "Azure Data Factory",
            "Azure Stream Analytics",
            "Azure Data Explorer",
            "Power BI Embedded",
        ],
    ),
    (
        "DevOps",
        &["Azure DevOps", "Azure DevTest Labs", "Container Registry"],
    ),
];

pub const GCP_CATALOG: CategoryList = &[
    (
        "Compute",
        &[
            "Compute Engine",
            "Google Kubernetes Engine",
            "Cloud Run",
            "Cloud Functions",
            "App Engine",
            "Bare Metal Solution",
        ],
    ),
    (
        "Storage",
        &[
            "Cloud Storage",
            "Persistent Disk",
            "Filestore",
            "Cloud Storage for Firebase",
        ],
    ),
    (
        "Database",
        &[
            "Cloud SQL",
            "Cloud Spanner",
            "Firestore",
            "Cloud Bigtable",
            "Memorystore",
            "AlloyDB",
        ],
    ),
    (
        "Networking",
        &[
            "Cloud Load Balancing",
            "Cloud CDN",
            "Cloud DNS",
            "Cloud Interconnect",
            "Cloud VPN",
            "Cloud NAT",
            "Cloud Armor",
            "Traffic Director",
        ],
    ),
    (
        "AI & ML",
        &[
            "Vertex AI",
            "Cloud Natural Language",
            "Cloud Vision",
            "Cloud Speech-to-Text",
            "Cloud Text-to-Speech",
            "Cloud Translation",
            "Gemini",
            "Document AI",
        ],
    ),
    (
        "Data & Analytics",
        &[
            "BigQuery",
            "Dataflow",
            "Dataproc",
            "Pub/Sub",
            "Cloud Composer",
            "Data Catalog",
            "Looker",
        ],
    ),
    (
        "Application Integration",
        &[
            "Cloud Tasks",
            "Cloud Scheduler",
            "Workflows",
            "Eventarc",
            "API Gateway",
            "Apigee",
        ],
    ),
    (
        "Security & Identity",
        &[
            "Identity and Access Management",
            "Cloud KMS",
            "Secret Manager",
            "Security Command Center",
            "Cloud Identity",
            "BeyondCorp Enterprise",
        ],
    ),
    (
        "Management & Monitoring",
        &[
            "Cloud Monitoring",
            "Cloud Logging",
            "Cloud Trace",
            "Cloud Profiler",
            "Error Reporting",
            "Cloud Console",
        ],
    ),
    (
        "DevOps",
        &[
            "Cloud Build",
            "Artifact Registry",
            "Container Registry",
            "Cloud Deploy",
            "Cloud Source Repositories",
        ],
    ),
    (
        "Migration & Transfer",
        &[
            "Database Migration Service",
            "Transfer Appliance",
            "Storage Transfer Service",
            "Migrate to Virtual Machines",
        ],
    ),
];

pub fn categories(provider: Provider) -> CategoryList {
    match provider {
        Provider::Aws => AWS_CATALOG,
        Provider::Azure => AZURE_CATALOG,
        Provider::Gcp => GCP_CATALOG,
    }
}

/// Flat view of a provider's catalog in declaration order.
pub fn entries(provider: Provider) -> impl Iterator<Item = ServiceCatalogEntry> {
    categories(provider).iter().flat_map(|&(category, names)| {
        names.iter().map(move |&name| ServiceCatalogEntry { category, name })
    })
}

/// Annotate every catalog entry, grouped by category in declaration order.
pub fn overlay<T, F>(provider: Provider, mut annotate: F) -> Vec<(String, Vec<T>)>
where
    F: FnMut(&ServiceCatalogEntry) -> T,
{
    let mut grouped: Vec<(String, Vec<T>)> = Vec::new();

    for entry in entries(provider) {
        let value = annotate(&entry);
        let same_category = grouped
            .last()
            .is_some_and(|(category, _)| category.as_str() == entry.category);

        if same_category {
            if let Some((_, values)) = grouped.last_mut() {
                values.push(value);
            }
        } else {
            grouped.push((entry.category.to_string(), vec![value]));
        }
    }

    grouped
}

pub fn service_count(provider: Provider) -> usize {
    categories(provider).iter().map(|(_, names)| names.len()).sum()
}
