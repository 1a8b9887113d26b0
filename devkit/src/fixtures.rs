/*!
Sorties `mongo --quiet --eval "printjson(db.serverStatus())"` de référence

Tronquées, mais avec les constructeurs du shell (`ISODate`, `NumberLong`)
tels qu'ils sortent réellement.
*/

/// Document d'un mongod 3.x sain
pub const SERVER_STATUS: &str = r#"{
	"host" : "db01.example.net",
	"version" : "3.4.24",
	"process" : "mongod",
	"pid" : NumberLong(2841),
	"uptime" : 86400,
	"uptimeMillis" : NumberLong(86400123),
	"uptimeEstimate" : NumberLong(86399),
	"localTime" : ISODate("2024-01-31T12:00:00.000Z"),
	"asserts" : {
		"regular" : 0,
		"warning" : 0
	},
	"connections" : {
		"current" : 12,
		"available" : 51188,
		"totalCreated" : 4242
	},
	"extra_info" : {
		"note" : "fields vary by platform",
		"page_faults" : 37
	},
	"globalLock" : {
		"totalTime" : NumberLong("86400123000"),
		"currentQueue" : {
			"total" : 0,
			"readers" : 0,
			"writers" : 0
		},
		"activeClients" : {
			"total" : 18,
			"readers" : 0,
			"writers" : 0
		}
	},
	"mem" : {
		"bits" : 64,
		"resident" : 512,
		"virtual" : 1536,
		"supported" : true,
		"mapped" : 0
	},
	"opcounters" : {
		"insert" : 1000,
		"query" : 2000,
		"update" : 300,
		"delete" : 40,
		"getmore" : 5,
		"command" : 60000
	},
	"wiredTiger" : {
		"foo" : 1
	},
	"ok" : 1
}"#;

/// Clés du whitelist présentes dans `SERVER_STATUS`
pub const SERVER_STATUS_METRICS: &[&str] = &[
    "mongo.connections.current",
    "mongo.extra.info.page.faults",
    "mongo.globalLock.activeClients.readers",
    "mongo.globalLock.activeClients.total",
    "mongo.globalLock.activeClients.writers",
    "mongo.globalLock.currentQueue.readers",
    "mongo.globalLock.currentQueue.total",
    "mongo.globalLock.currentQueue.writers",
    "mongo.mem.mapped",
    "mongo.mem.resident",
    "mongo.mem.virtual",
    "mongo.opcounters.command",
    "mongo.opcounters.delete",
    "mongo.opcounters.getmore",
    "mongo.opcounters.insert",
    "mongo.opcounters.query",
    "mongo.opcounters.update",
];

/// Document minimal: deux métriques du whitelist et du bruit
pub const MINIMAL_STATUS: &str = r#"{
	"host" : "db02.example.net",
	"opcounters" : {
		"insert" : NumberLong(7)
	},
	"connections" : {
		"current" : 3
	},
	"network" : {
		"bytesIn" : NumberLong(1024)
	}
}"#;

/// Un replica set émet des `Timestamp(t, i)` que le nettoyage textuel casse
pub const REPLICA_STATUS: &str = r#"{
	"repl" : {
		"setName" : "rs0",
		"electionId" : ObjectId("7fffffff0000000000000001"),
		"lastWrite" : {
			"opTime" : {
				"ts" : Timestamp(1706702400, 1)
			}
		}
	},
	"connections" : {
		"current" : 3
	}
}"#;
